//! The intermediate representation handed to code generators.

mod builder;

pub use builder::build_requests;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    headers::Headers,
    query::QueryValue,
    url::UrlParts,
    value::ArgValue,
    warnings::Warnings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// curl strips carriage returns and newlines (`-d @file`).
    Text,
    Binary,
}

/// A file curl reads at run time. A path of `-` is standard input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRef {
    pub path: ArgValue,
    pub read_mode: ReadMode,
}

impl FileRef {
    pub fn is_stdin(&self) -> bool {
        self.path.eq_str("-")
    }
}

/// Which data option produced a part of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Data,
    Raw,
    Binary,
    Urlencode,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum DataPart {
    Text { value: ArgValue },
    /// `@file`, or `name@file` for `--data-urlencode`, whose contents get encoded.
    File {
        kind: DataKind,
        name: Option<ArgValue>,
        file: FileRef,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PartContent {
    Text { value: ArgValue },
    /// `name=@file`, uploaded as a file.
    File { file: FileRef },
    /// `name=<file`, sent as a text field.
    FileContents { file: FileRef },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultipartPart {
    pub name: ArgValue,
    pub content: PartContent,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub headers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Body {
    #[default]
    None,
    Raw(ArgValue),
    /// Data that reads at least one file, split around the file reads.
    FormParts(Vec<DataPart>),
    Multipart(Vec<MultipartPart>),
}

impl Body {
    pub fn is_none(&self) -> bool {
        matches!(self, Body::None)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthType {
    #[default]
    Basic,
    Digest,
    Ntlm,
    NtlmWb,
    Negotiate,
    Anyauth,
    Bearer,
    AwsSigv4,
}

/// A number as written, normalized when it is a literal curl accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Numeric<T> {
    Parsed(T),
    Raw(ArgValue),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestUrl {
    /// The URL argument before globbing.
    pub raw: ArgValue,
    /// With the merged query, without userinfo.
    pub url: ArgValue,
    pub parts: UrlParts,
    pub method: ArgValue,
    pub query_list: Option<Vec<(ArgValue, ArgValue)>>,
    pub query_dict: Option<IndexMap<String, QueryValue>>,
    pub query_reads_file: Option<ArgValue>,
    pub url_without_query_list: ArgValue,
    pub auth: Option<(ArgValue, ArgValue)>,
    pub upload_file: Option<ArgValue>,
    pub output: Option<ArgValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HttpVersion {
    Http1_0,
    Http1_1,
    Http2,
    Http2PriorKnowledge,
    Http3,
    Http3Only,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Netrc {
    Optional,
    Required,
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tls {
    pub insecure: bool,
    /// Minimum version from `--tlsv1.x`, e.g. `1.2`.
    pub min_version: Option<String>,
    pub max_version: Option<ArgValue>,
    pub cert: Option<ArgValue>,
    pub cert_password: Option<ArgValue>,
    pub cert_type: Option<ArgValue>,
    pub key: Option<ArgValue>,
    pub key_type: Option<ArgValue>,
    pub key_password: Option<ArgValue>,
    pub cacert: Option<ArgValue>,
    pub capath: Option<ArgValue>,
    pub ca_native: bool,
    pub crlfile: Option<ArgValue>,
    pub pinned_pubkey: Option<ArgValue>,
    pub ciphers: Option<ArgValue>,
    pub tls13_ciphers: Option<ArgValue>,
    pub curves: Option<ArgValue>,
    pub cert_status: bool,
    pub hsts: Option<ArgValue>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProxyKind {
    #[default]
    Http,
    Http1,
    Http2,
    Socks4,
    Socks4a,
    Socks5,
    Socks5Hostname,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Proxy {
    pub url: ArgValue,
    pub kind: ProxyKind,
    pub auth: Option<(ArgValue, ArgValue)>,
    pub auth_type: AuthType,
    pub headers: Headers,
    pub tunnel: bool,
    pub insecure: bool,
    pub cacert: Option<ArgValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeouts {
    /// All in seconds.
    pub max_time: Option<Numeric<f64>>,
    pub connect_timeout: Option<Numeric<f64>>,
    pub expect100_timeout: Option<Numeric<f64>>,
    pub happy_eyeballs_timeout: Option<Numeric<f64>>,
    pub keepalive_time: Option<Numeric<f64>>,
    pub speed_limit: Option<Numeric<u64>>,
    pub speed_time: Option<Numeric<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Retry {
    pub count: Option<Numeric<i64>>,
    /// Seconds.
    pub delay: Option<Numeric<f64>>,
    pub max_time: Option<Numeric<f64>>,
    pub connrefused: bool,
    pub all_errors: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Redirects {
    pub follow: bool,
    pub trusted: bool,
    pub max: Option<Numeric<i64>>,
    pub post301: bool,
    pub post302: bool,
    pub post303: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Connection {
    pub ipv4: bool,
    pub ipv6: bool,
    pub interface: Option<ArgValue>,
    pub local_port: Option<Numeric<(u16, Option<u16>)>>,
    pub unix_socket: Option<ArgValue>,
    pub abstract_unix_socket: Option<ArgValue>,
    pub resolve: Vec<ArgValue>,
    pub connect_to: Vec<ArgValue>,
    pub keepalive: Option<bool>,
    pub tcp_nodelay: Option<bool>,
    pub limit_rate: Option<Numeric<u64>>,
    pub max_filesize: Option<Numeric<u64>>,
    pub doh_url: Option<ArgValue>,
}

/// One curl invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Request {
    /// Never empty. The first one is what single-request generators use.
    pub urls: Vec<RequestUrl>,
    pub headers: Headers,
    pub body: Body,
    /// The body (or `--get` query) as curl sees it, with `@file` references.
    pub data: Option<ArgValue>,
    pub data_reads_file: Option<ArgValue>,
    pub is_json: bool,
    /// Effective media type, including `multipart/form-data` which curl sends
    /// without the user setting it.
    pub content_type: Option<String>,
    pub auth_type: AuthType,
    pub aws_sigv4: Option<ArgValue>,
    pub oauth2_bearer: Option<ArgValue>,
    pub delegation: Option<ArgValue>,
    pub cookies: Option<Vec<(ArgValue, ArgValue)>>,
    pub cookie_files: Vec<ArgValue>,
    pub cookie_jar: Option<ArgValue>,
    pub referer_auto: bool,
    pub compressed: bool,
    pub transfer_encoding: bool,
    pub form_escape: bool,
    pub netrc: Option<Netrc>,
    pub netrc_file: Option<ArgValue>,
    pub proxy: Option<Proxy>,
    pub noproxy: Option<ArgValue>,
    pub tls: Tls,
    pub timeouts: Timeouts,
    pub retry: Retry,
    pub redirects: Redirects,
    pub connection: Connection,
    pub http_version: Option<HttpVersion>,
    pub http0_9: bool,
    pub fail: bool,
    pub path_as_is: bool,
    pub continue_at: Option<ArgValue>,
    pub stdin: Option<ArgValue>,
    pub stdin_file: Option<ArgValue>,
    pub verbose: bool,
    pub silent: bool,
}

/// What a generator can express. Parts it can't are reported by
/// [`warn_if_parts_ignored`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Support {
    pub multiple_urls: bool,
    pub data_reads_file: bool,
    pub query_reads_file: bool,
    pub cookie_files: bool,
}

/// The request a single-request generator should render.
pub fn first_request<'a>(requests: &'a [Request], warnings: &mut Warnings) -> Option<&'a Request> {
    if requests.len() > 1 {
        warnings.push(
            "multiple-requests",
            format!(
                "found {} requests, only the first one will be converted",
                requests.len()
            ),
        );
    }
    requests.first()
}

pub fn warn_if_parts_ignored(request: &Request, support: Support, warnings: &mut Warnings) {
    if request.urls.len() > 1 && !support.multiple_urls {
        warnings.push(
            "multiple-urls",
            format!(
                "found {} URLs, only the first one will be used: {}",
                request.urls.len(),
                request.urls[0].url
            ),
        );
    }
    if let Some(file) = &request.data_reads_file {
        if !support.data_reads_file {
            warnings.push(
                "unsafe-data",
                format!("the body is read from {file} at run time, the file is ignored"),
            );
        }
    }
    if !support.query_reads_file {
        if let Some(file) = request.urls.iter().find_map(|u| u.query_reads_file.as_ref()) {
            warnings.push(
                "unsafe-query",
                format!("the query string is read from {file} at run time, the file is ignored"),
            );
        }
    }
    if !request.cookie_files.is_empty() && !support.cookie_files {
        let files: Vec<String> = request.cookie_files.iter().map(|f| f.to_string()).collect();
        warnings.push(
            "cookie-files",
            format!("passing cookie files with -b is not supported: {}", files.join(", ")),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_urls(n: usize) -> Request {
        let url = RequestUrl {
            raw: "a.com".into(),
            url: "http://a.com".into(),
            parts: UrlParts::default(),
            method: "GET".into(),
            query_list: None,
            query_dict: None,
            query_reads_file: None,
            url_without_query_list: "http://a.com".into(),
            auth: None,
            upload_file: None,
            output: None,
        };
        Request {
            urls: vec![url; n],
            ..Default::default()
        }
    }

    #[test]
    fn test_first_request() {
        let mut warnings = Warnings::new();
        let requests = vec![with_urls(1), with_urls(2)];
        assert_eq!(first_request(&requests, &mut warnings).unwrap().urls.len(), 1);
        assert_eq!(warnings.codes(), vec!["multiple-requests"]);

        let mut warnings = Warnings::new();
        assert!(first_request(&requests[..1], &mut warnings).is_some());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_warn_if_parts_ignored() {
        let mut request = with_urls(2);
        request.data_reads_file = Some("body.json".into());
        request.cookie_files = vec!["jar.txt".into()];
        request.urls[1].query_reads_file = Some("q.txt".into());

        let mut warnings = Warnings::new();
        warn_if_parts_ignored(&request, Support::default(), &mut warnings);
        assert_eq!(
            warnings.codes(),
            vec!["multiple-urls", "unsafe-data", "unsafe-query", "cookie-files"]
        );

        let mut warnings = Warnings::new();
        let support = Support {
            multiple_urls: true,
            data_reads_file: true,
            query_reads_file: true,
            cookie_files: true,
        };
        warn_if_parts_ignored(&request, support, &mut warnings);
        assert!(warnings.is_empty());
    }
}
