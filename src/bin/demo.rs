use curlir::{Support, first_request, parse_curl_command, warn_if_parts_ignored};

fn main() {
    let curl_command = "curl 'http://example.com/api?page=1' -H 'Accept: application/json' -d @body.json";
    let mut output = match parse_curl_command(curl_command) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    if let Some(request) = first_request(&output.requests, &mut output.warnings) {
        warn_if_parts_ignored(request, Support::default(), &mut output.warnings);
        println!("{:#?}", request);
    }
    println!("{:?}", output.warnings);
}
