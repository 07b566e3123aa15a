use curlir::{
    ArgValue, CurlError, CurlParser, ParseOutput, Request, Support, SupportedOptions,
    first_request, parse_curl_command,
    query::parse_query,
    request::{AuthType, Body, PartContent, ReadMode},
    warn_if_parts_ignored,
};
use rstest::*;

fn parse(command: &str) -> ParseOutput {
    parse_curl_command(command).unwrap()
}

fn request(command: &str) -> Request {
    parse(command).requests.remove(0)
}

#[rstest]
#[case("curl -X POST https://a.com")]
#[case("curl -X POST -d x=1 https://a.com")]
#[case("curl -d x=1 -X POST https://a.com")]
#[case("curl -XPOST -G -d x=1 https://a.com")]
#[case("curl -X GET -X POST -T file https://a.com")]
fn test_explicit_post_wins(#[case] command: &str) {
    assert_eq!(request(command).urls[0].method.as_literal(), Some("POST"));
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(5)]
fn test_every_header_is_kept(#[case] n: usize) {
    let headers: Vec<String> = (0..n).map(|i| format!("-H 'X-Same: {i}'")).collect();
    let request = request(&format!("curl {} https://a.com", headers.join(" ")));
    assert_eq!(request.headers.len(), n);
    let values: Vec<String> = request
        .headers
        .iter()
        .map(|(_, v)| v.as_ref().unwrap().to_string())
        .collect();
    let expected: Vec<String> = (0..n).map(|i| i.to_string()).collect();
    assert_eq!(values, expected);
}

#[test]
fn test_data_is_joined() {
    let request = request("curl -d a=1 -d b=2 https://a.com");
    assert_eq!(request.body, Body::Raw(ArgValue::from("a=1&b=2")));
    assert_eq!(request.urls[0].method.as_literal(), Some("POST"));
    assert_eq!(
        request.headers.get("content-type").flatten().unwrap().as_literal(),
        Some("application/x-www-form-urlencoded")
    );
}

#[test]
fn test_multipart_file() {
    let request = request("curl -F f=@file.bin https://a.com");
    let Body::Multipart(parts) = &request.body else {
        panic!("expected multipart, got {:?}", request.body);
    };
    assert_eq!(parts.len(), 1);
    let PartContent::File { file } = &parts[0].content else {
        panic!("expected a file part, got {:?}", parts[0].content);
    };
    assert_eq!(file.path.as_literal(), Some("file.bin"));
    assert_eq!(file.read_mode, ReadMode::Binary);
    assert_eq!(request.content_type.as_deref(), Some("multipart/form-data"));
}

#[test]
fn test_user_without_password() {
    let request = request("curl -u alice: https://a.com");
    assert_eq!(request.urls[0].auth, Some(("alice".into(), "".into())));
    assert_eq!(request.auth_type, AuthType::Basic);
}

#[test]
fn test_data_urlencode_encodes_plus() {
    let request = request("curl --data-urlencode name=a+b https://a.com");
    let Body::Raw(body) = &request.body else {
        panic!("expected a raw body");
    };
    assert!(body.to_string().contains("name=a%2Bb"));
}

#[test]
fn test_unknown_option() {
    let err = parse_curl_command("curl --frobnicate https://a.com").unwrap_err();
    assert!(matches!(&err, CurlError::UnknownOption { option, .. } if option.contains("frobnicate")));
    assert!(err.to_string().contains("--frobnicate"));
}

#[test]
fn test_unsupported_option_is_ignored_with_warning() {
    let parser = CurlParser::new().with_supported(SupportedOptions::common());
    let output = parser.parse("curl --http1.0 https://a.com").unwrap();
    assert_eq!(output.requests.len(), 1);
    assert!(output.requests[0].http_version.is_none());
    assert_eq!(output.warnings.codes(), vec!["unsupported-option"]);

    let output = parse("curl --http1.0 https://a.com");
    assert!(output.requests[0].http_version.is_some());
    assert!(output.warnings.is_empty());
}

#[rstest]
#[case("a=1&b=2&a=3")]
#[case("q=hello+world&x=%2F")]
#[case("list[]=1&list[]=2")]
#[case("empty=&k=v")]
#[case("k=%E2%9C%93")]
fn test_query_round_trip(#[case] query: &str) {
    let parsed = parse_query(&ArgValue::from(query)).unwrap();
    assert!(parsed.round_trips);
    assert_eq!(parsed.to_query_string().unwrap().as_literal(), Some(query));
}

#[rstest]
#[case("curl 'https://a.com/p?x=1&y=two+words'")]
#[case("curl -G -d 'q=a b' --url-query 'p=1' https://a.com/s")]
fn test_reparsing_canonical_url_is_idempotent(#[case] command: &str) {
    let first = request(command);
    let url = &first.urls[0];
    let again = request(&format!("curl '{}'", url.url));
    assert_eq!(again.urls[0].query_list, url.query_list);
    assert_eq!(again.urls[0].url, url.url);
}

#[test]
fn test_generator_helpers() {
    let mut output = parse(
        "curl -b jar.txt -d @body.json 'https://a.com/{x,y}' && curl https://b.com",
    );
    let request = first_request(&output.requests, &mut output.warnings).unwrap().clone();
    warn_if_parts_ignored(&request, Support::default(), &mut output.warnings);
    let codes = output.warnings.codes();
    for code in ["multiple-requests", "multiple-urls", "unsafe-data", "cookie-files"] {
        assert!(codes.contains(&code), "missing {code} in {codes:?}");
    }
}

#[test]
fn test_ir_serializes() {
    let output = parse("curl -H 'X: 1' -d a=1 https://a.com");
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["requests"][0]["urls"][0]["method"], "POST");
    assert_eq!(json["requests"][0]["body"]["value"], "a=1");
}
