use crate::{
    curl::{
        CurlOption::{self, *},
        OptValue, OperationConfig, ParsedArgs,
        form::{FormSource, parse_form},
        values::{parse_integer, parse_port_range, parse_seconds, parse_size},
    },
    error::{CurlError, Result},
    headers::Headers,
    query::{encode_component, parse_cookies, parse_query},
    url::{glob, parse_url},
    value::{ArgValue, Piece},
    warnings::Warnings,
};

use super::{
    AuthType, Body, Connection, DataKind, DataPart, FileRef, HttpVersion, MultipartPart, Netrc,
    Numeric, PartContent, Proxy, ProxyKind, ReadMode, Redirects, Request, RequestUrl, Retry,
    Timeouts, Tls,
};

const DATA_OPTIONS: &[CurlOption] = &[Data, DataAscii, DataBinary, DataRaw, DataUrlencode, Json];
const FORM_OPTIONS: &[CurlOption] = &[Form, FormString];

const STANDARD_METHODS: &[&str] = &[
    "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
];

const AUTH_OPTIONS: &[(CurlOption, AuthType)] = &[
    (Basic, AuthType::Basic),
    (Digest, AuthType::Digest),
    (Ntlm, AuthType::Ntlm),
    (NtlmWb, AuthType::NtlmWb),
    (Negotiate, AuthType::Negotiate),
    (Anyauth, AuthType::Anyauth),
    (Oauth2Bearer, AuthType::Bearer),
    (AwsSigv4, AuthType::AwsSigv4),
];

const PROXY_AUTH_OPTIONS: &[(CurlOption, AuthType)] = &[
    (ProxyBasic, AuthType::Basic),
    (ProxyDigest, AuthType::Digest),
    (ProxyNtlm, AuthType::Ntlm),
    (ProxyNegotiate, AuthType::Negotiate),
    (ProxyAnyauth, AuthType::Anyauth),
];

const CERT_TYPES: &[&str] = &["PEM", "DER", "ENG", "P12"];

/// Turns every `--next` section of `parsed` into a [`Request`].
///
/// `stdin` and `stdin_file` describe what the shell feeds curl: literal content from
/// `echo`/`printf`/here-strings, or a file from `cat file |` and `< file`.
pub fn build_requests(
    parsed: &ParsedArgs,
    stdin: Option<&ArgValue>,
    stdin_file: Option<&ArgValue>,
    warnings: &mut Warnings,
) -> Result<Vec<Request>> {
    let mut requests = Vec::with_capacity(parsed.operations.len());
    for config in &parsed.operations {
        let builder = Builder {
            config,
            global: &parsed.global,
            stdin,
            stdin_file,
            stdin_claim: None,
            warnings: &mut *warnings,
        };
        requests.push(builder.build()?);
    }
    Ok(requests)
}

struct Builder<'a> {
    config: &'a OperationConfig,
    global: &'a OperationConfig,
    stdin: Option<&'a ArgValue>,
    stdin_file: Option<&'a ArgValue>,
    /// The option that already reads standard input.
    stdin_claim: Option<String>,
    warnings: &'a mut Warnings,
}

/// Data options after `@file`s and `-` are resolved.
#[derive(Debug, Default)]
struct BuiltData {
    parts: Vec<DataPart>,
    /// What curl sends, with `@file` in place of file contents.
    text: ArgValue,
    reads_file: Option<ArgValue>,
}

/// The `-T` file for one URL.
#[derive(Debug)]
struct Upload {
    file: ArgValue,
    /// `-T -` or `-T .`, even when the shell redirects a file into stdin.
    from_stdin: bool,
}

impl<'a> Builder<'a> {
    fn build(mut self) -> Result<Request> {
        let config = self.config;
        let raw_urls: Vec<&ArgValue> = config.urls().collect();
        if raw_urls.is_empty() {
            return Err(CurlError::NoUrl);
        }

        let get = config.enabled(Get);
        let data_params = self.data_params();
        let forms: Vec<_> = config.filter(FORM_OPTIONS).collect();
        let uploads: Vec<&ArgValue> = config.values(UploadFile).collect();
        let outputs: Vec<&ArgValue> = config.values(Output).collect();

        if !data_params.is_empty() && !forms.is_empty() {
            return Err(CurlError::UnsupportedCombination(
                "--data and --form can't be used together".into(),
            ));
        }
        if !uploads.is_empty() && (!forms.is_empty() || (!data_params.is_empty() && !get)) {
            return Err(CurlError::UnsupportedCombination(format!(
                "--upload-file can't be used together with {}",
                if forms.is_empty() { "--data" } else { "--form" }
            )));
        }
        if get && !uploads.is_empty() {
            self.warnings.push(
                "upload-file-with-get",
                "--get is ignored for URLs that upload a file",
            );
        }

        let mut request = Request {
            stdin: self.stdin.cloned(),
            stdin_file: self.stdin_file.cloned(),
            is_json: config.has(Json),
            ..Default::default()
        };

        // -G sends the data in the query string instead
        let mut query_params = self.url_query_params();
        let mut has_body = false;
        if get {
            query_params.extend(data_params.iter().cloned());
        } else if !data_params.is_empty() {
            let data = self.build_data(&data_params, "--data")?;
            request.body = match data.reads_file {
                Some(_) => Body::FormParts(data.parts),
                None => Body::Raw(data.text.clone()),
            };
            request.data = Some(data.text);
            request.data_reads_file = data.reads_file;
            has_body = true;
        }
        if !forms.is_empty() {
            let mut parts = Vec::with_capacity(forms.len());
            for invocation in forms {
                if let Some(arg) = invocation.value.as_value() {
                    parts.push(self.multipart_part(arg, invocation.option == FormString)?);
                }
            }
            request.body = Body::Multipart(parts);
            request.form_escape = config.enabled(FormEscape);
            has_body = true;
        }
        let shared_query = if query_params.is_empty() {
            None
        } else {
            Some(self.build_data(&query_params, "--url-query")?)
        };
        if get && !data_params.is_empty() {
            request.data = shared_query.as_ref().map(|q| q.text.clone());
        }

        if uploads.len() > raw_urls.len() {
            self.warnings.push(
                "too-many-upload-files",
                format!(
                    "got {} --upload-file options but only {} URLs, the extra files are ignored",
                    uploads.len(),
                    raw_urls.len()
                ),
            );
        }
        if outputs.len() > raw_urls.len() {
            self.warnings.push(
                "too-many-output-files",
                format!(
                    "got {} --output options but only {} URLs, the extra files are ignored",
                    outputs.len(),
                    raw_urls.len()
                ),
            );
        }

        for (i, raw) in raw_urls.iter().enumerate() {
            let upload = match uploads.get(i) {
                Some(file) => Some(self.upload_file(file)?),
                None => None,
            };
            let expanded = if config.enabled(Globoff) {
                vec![(*raw).clone()]
            } else {
                glob::expand(raw)?
            };
            for url in expanded {
                let record = self.request_url(
                    raw,
                    &url,
                    shared_query.as_ref(),
                    upload.as_ref(),
                    outputs.get(i).copied(),
                    has_body,
                )?;
                request.urls.push(record);
            }
        }

        request.headers = self.headers(&mut request);
        request.content_type = request.headers.content_type().or_else(|| {
            matches!(request.body, Body::Multipart(_)).then(|| "multipart/form-data".to_string())
        });
        self.auth(&mut request);
        request.compressed = config.enabled(Compressed);
        if request.compressed {
            request.headers.set_if_missing("Accept-Encoding", "deflate, gzip");
        }
        request.transfer_encoding = config.enabled(TrEncoding);

        request.netrc = self.netrc();
        request.netrc_file = config.last(NetrcFile).cloned();
        request.proxy = self.proxy();
        request.noproxy = config.last(Noproxy).cloned();
        request.tls = self.tls();
        request.timeouts = self.timeouts();
        request.retry = self.retry();
        request.redirects = self.redirects();
        request.connection = self.connection();
        request.http_version = config.last_of(&[Http1_0, Http1_1, Http2, Http2PriorKnowledge, Http3, Http3Only])
            .map(|i| match i.option {
                Http1_0 => HttpVersion::Http1_0,
                Http1_1 => HttpVersion::Http1_1,
                Http2 => HttpVersion::Http2,
                Http2PriorKnowledge => HttpVersion::Http2PriorKnowledge,
                Http3 => HttpVersion::Http3,
                _ => HttpVersion::Http3Only,
            });
        request.http0_9 = config.enabled(Http0_9);
        request.fail = config.enabled(Fail) || config.enabled(FailWithBody);
        request.path_as_is = config.enabled(PathAsIs);
        request.continue_at = config.last(ContinueAt).cloned();
        request.cookie_jar = config.last(CookieJar).cloned();
        request.verbose = self.global.enabled(Verbose);
        request.silent = self.global.enabled(Silent);

        tracing::debug!(
            urls = request.urls.len(),
            headers = request.headers.len(),
            method = %request.urls[0].method,
            "built request"
        );
        Ok(request)
    }

    fn claim_stdin(&mut self, option: &str) -> Result<()> {
        if let Some(previous) = &self.stdin_claim {
            return Err(CurlError::UnsupportedCombination(format!(
                "{previous} and {option} both read standard input"
            )));
        }
        self.stdin_claim = Some(option.to_string());
        Ok(())
    }

    fn stdin_path(&self, path: ArgValue) -> ArgValue {
        match self.stdin_file {
            Some(file) if path.eq_str("-") => file.clone(),
            _ => path,
        }
    }

    fn data_params(&self) -> Vec<(DataKind, ArgValue)> {
        self.config
            .filter(DATA_OPTIONS)
            .filter_map(|invocation| {
                let value = invocation.value.as_value()?.clone();
                let kind = match invocation.option {
                    DataBinary => DataKind::Binary,
                    DataRaw => DataKind::Raw,
                    DataUrlencode => DataKind::Urlencode,
                    Json => DataKind::Json,
                    _ => DataKind::Data,
                };
                Some((kind, value))
            })
            .collect()
    }

    /// `--url-query` values, `+value` sent as is and anything else like `--data-urlencode`.
    fn url_query_params(&self) -> Vec<(DataKind, ArgValue)> {
        self.config
            .values(UrlQuery)
            .map(|value| match value.strip_prefix("+") {
                Some(raw) => (DataKind::Raw, raw),
                None => (DataKind::Urlencode, value.clone()),
            })
            .collect()
    }

    fn build_data(&mut self, params: &[(DataKind, ArgValue)], option: &str) -> Result<BuiltData> {
        let mut built = BuiltData::default();
        let mut run = ArgValue::new();
        for (i, (kind, value)) in params.iter().enumerate() {
            let kind = *kind;
            if i > 0 && kind != DataKind::Json {
                run.push_char('&');
                built.text.push_char('&');
            }

            let mut name = None;
            let file = match kind {
                DataKind::Urlencode => {
                    // name=content, =content, content, @file, name@file
                    let at_file = !value.contains("=") && value.contains("@");
                    let separator = if at_file { "@" } else { "=" };
                    let mut content = value.clone();
                    if let Some((n, c)) = value.split_once(separator) {
                        name = (!n.is_empty()).then_some(n);
                        content = c;
                    }
                    if !at_file {
                        let mut encoded = ArgValue::new();
                        if let Some(n) = &name {
                            encoded.append(n);
                            encoded.push_char('=');
                        }
                        encoded.append(&encode_component(&content));
                        run.append(&encoded);
                        built.text.append(&encoded);
                        continue;
                    }
                    content
                }
                DataKind::Raw => {
                    run.append(value);
                    built.text.append(value);
                    continue;
                }
                _ => match value.strip_prefix("@") {
                    Some(path) => path,
                    None => {
                        run.append(value);
                        built.text.append(value);
                        continue;
                    }
                },
            };

            if file.eq_str("-") {
                self.claim_stdin(option)?;
                if let Some(content) = self.stdin {
                    let content = match kind {
                        DataKind::Binary | DataKind::Json => content.clone(),
                        DataKind::Urlencode => encode_component(content),
                        _ => content.replace("\n", "").replace("\r", ""),
                    };
                    let mut piece = ArgValue::new();
                    if let Some(n) = &name {
                        piece.append(n);
                        piece.push_char('=');
                    }
                    piece.append(&content);
                    run.append(&piece);
                    built.text.append(&piece);
                    continue;
                }
            }

            let path = self.stdin_path(file);
            if let Some(n) = &name {
                built.text.append(n);
                built.text.push_char('=');
            }
            built.text.push_char('@');
            built.text.append(&path);
            if !run.is_empty() {
                built.parts.push(DataPart::Text {
                    value: std::mem::take(&mut run),
                });
            }
            built.reads_file.get_or_insert_with(|| path.clone());
            let read_mode = match kind {
                DataKind::Data => ReadMode::Text,
                _ => ReadMode::Binary,
            };
            built.parts.push(DataPart::File {
                kind,
                name,
                file: FileRef { path, read_mode },
            });
        }
        if !run.is_empty() {
            built.parts.push(DataPart::Text { value: run });
        }
        Ok(built)
    }

    fn multipart_part(&mut self, arg: &ArgValue, literal: bool) -> Result<MultipartPart> {
        let form = parse_form(arg, literal, self.warnings)?;
        let reads_stdin = form.source != FormSource::Text && form.value.eq_str("-");
        if reads_stdin {
            self.claim_stdin("--form")?;
        }
        let content = match form.source {
            FormSource::Text => PartContent::Text { value: form.value },
            FormSource::FileContents if reads_stdin && self.stdin.is_some() => PartContent::Text {
                value: self.stdin.cloned().unwrap_or_default(),
            },
            FormSource::FileContents => PartContent::FileContents {
                file: FileRef {
                    path: self.stdin_path(form.value),
                    read_mode: ReadMode::Text,
                },
            },
            FormSource::File => PartContent::File {
                file: FileRef {
                    path: self.stdin_path(form.value),
                    read_mode: ReadMode::Binary,
                },
            },
        };
        Ok(MultipartPart {
            name: form.name,
            content,
            filename: form.filename,
            content_type: form.content_type,
            headers: form.headers,
        })
    }

    fn upload_file(&mut self, file: &ArgValue) -> Result<Upload> {
        if file.eq_str("-") || file.eq_str(".") {
            self.claim_stdin("--upload-file")?;
            if self.stdin.is_some() {
                self.warnings.push(
                    "upload-stdin",
                    "--upload-file reads standard input, which is piped from another command",
                );
            }
            return Ok(Upload {
                file: self.stdin_path(ArgValue::from("-")),
                from_stdin: true,
            });
        }
        Ok(Upload {
            file: file.clone(),
            from_stdin: false,
        })
    }

    fn request_url(
        &mut self,
        raw: &ArgValue,
        url: &ArgValue,
        shared_query: Option<&BuiltData>,
        upload: Option<&Upload>,
        output: Option<&ArgValue>,
        has_body: bool,
    ) -> Result<RequestUrl> {
        let config = self.config;
        let mut parts = parse_url(
            url,
            config.last(ProtoDefault),
            !config.enabled(DisallowUsernameInUrl),
            self.warnings,
        )?;

        if let Some(Upload { file, from_stdin: false }) = upload {
            // curl appends the file name when the URL has no file part
            let name = match file.as_literal() {
                Some(path) => ArgValue::from(path.rsplit(['/', '\\']).next().unwrap_or(path)),
                None => file.clone(),
            };
            if parts.path.is_empty() {
                parts.path = name.prepend_str("/");
            } else if parts.path.ends_with("/") {
                parts.path.append(&name);
            }
        }

        let mut query_reads_file = None;
        if let Some(shared) = shared_query {
            let mut query = parts.query_text();
            if !query.is_empty() && !shared.text.is_empty() {
                query.push_char('&');
            }
            query.append(&shared.text);
            parts.query = if query.is_empty() { query } else { query.prepend_str("?") };
            query_reads_file = shared.reads_file.clone();
        }

        let mut query_list = None;
        let mut query_dict = None;
        let query = parts.query_text();
        if !query.is_empty() && query_reads_file.is_none() {
            match parse_query(&query) {
                Some(parsed) if parsed.round_trips => {
                    query_list = Some(parsed.list);
                    query_dict = parsed.dict;
                }
                _ => self.warnings.push(
                    "lossy-round-trip",
                    format!("query string \"{query}\" can't be split into key/value pairs without changing it, keeping it as written"),
                ),
            }
        }
        let url_without_query_list = if query_list.is_some() {
            parts.without_query()
        } else {
            parts.to_url()
        };

        let auth = match config.last(User) {
            Some(user) => Some(split_user(user)),
            None => parts.userinfo.as_ref().map(split_user),
        };

        Ok(RequestUrl {
            raw: raw.clone(),
            url: parts.to_url(),
            method: self.method(has_body, upload.map(|u| &u.file)),
            query_list,
            query_dict,
            query_reads_file,
            url_without_query_list,
            auth,
            upload_file: upload.map(|u| u.file.clone()),
            output: output.cloned(),
            parts,
        })
    }

    fn method(&mut self, has_body: bool, upload: Option<&ArgValue>) -> ArgValue {
        if let Some(method) = self.config.last(CurlOption::Request) {
            // Safari's "Copy as cURL" writes -X null
            if !method.eq_str("null") {
                if let Some(literal) = method.as_literal() {
                    let upper = literal.to_uppercase();
                    if upper != literal && STANDARD_METHODS.contains(&upper.as_str()) {
                        self.warnings.push(
                            "method-case",
                            format!("HTTP method {literal:?} is sent as written, not as {upper:?}"),
                        );
                    }
                }
                return method.clone();
            }
        }
        let method = if self.config.enabled(Head) {
            "HEAD"
        } else if upload.is_some_and(|f| !f.is_empty()) {
            "PUT"
        } else if has_body {
            "POST"
        } else {
            "GET"
        };
        ArgValue::from(method)
    }

    fn headers(&mut self, request: &mut Request) -> Headers {
        let config = self.config;
        let mut headers = Headers::from_args(config.values(Header), "--header", self.warnings);

        let (cookie_strings, cookie_files): (Vec<ArgValue>, Vec<ArgValue>) =
            config.values(Cookie).cloned().partition(|c| c.contains("="));
        request.cookie_files = cookie_files;
        if !cookie_strings.is_empty() {
            if headers.has("Cookie") {
                self.warnings.push(
                    "cookie-conflict",
                    "--cookie is ignored because a Cookie header is set",
                );
            } else {
                headers.set("Cookie", ArgValue::join(&cookie_strings, "; "));
            }
        }
        if headers.count("Cookie") == 1 {
            request.cookies = headers.get("Cookie").flatten().and_then(parse_cookies);
        }

        if let Some(agent) = config.last(UserAgent) {
            headers.set_if_missing("User-Agent", agent.clone());
        }
        if let Some(referer) = config.last(Referer) {
            let mut referer = referer.clone();
            if referer.ends_with(";auto") {
                request.referer_auto = true;
                referer = referer.slice(0, referer.len() - ";auto".len());
            }
            if !referer.is_empty() {
                headers.set_if_missing("Referer", referer);
            }
        }
        if let Some(range) = config.last(Range) {
            let mut value = range.prepend_str("bytes=");
            if !range.contains("-") {
                value.push_char('-');
            }
            headers.set_if_missing("Range", value);
        }
        if let Some(cond) = config.last(TimeCond) {
            let (name, date) = if let Some(date) = cond.strip_prefix("+") {
                ("If-Modified-Since", date)
            } else if let Some(date) = cond.strip_prefix("-") {
                ("If-Unmodified-Since", date)
            } else if let Some(date) = cond.strip_prefix("=") {
                ("Last-Modified", date)
            } else {
                ("If-Modified-Since", cond.clone())
            };
            headers.set_if_missing(name, date);
        }

        if request.is_json {
            headers.set_if_missing("Content-Type", "application/json");
            headers.set_if_missing("Accept", "application/json");
        } else if request.data.is_some() && !config.enabled(Get) {
            headers.set_if_missing("Content-Type", "application/x-www-form-urlencoded");
        }
        headers
    }

    fn auth(&mut self, request: &mut Request) {
        let config = self.config;
        let mut chosen: Vec<(AuthType, &str)> = Vec::new();
        for invocation in config.invocations() {
            let Some((_, auth_type)) = AUTH_OPTIONS.iter().find(|(o, _)| *o == invocation.option) else {
                continue;
            };
            if invocation.value == OptValue::Bool(false) {
                chosen.retain(|(t, _)| t != auth_type);
            } else {
                chosen.push((*auth_type, invocation.spelled.as_str()));
            }
        }
        if let Some((last, spelled)) = chosen.last() {
            for (auth_type, earlier) in &chosen[..chosen.len() - 1] {
                if auth_type != last {
                    self.warnings.push(
                        "auth-type-conflict",
                        format!("{earlier} is overridden by {spelled}"),
                    );
                }
            }
            request.auth_type = *last;
        }

        request.aws_sigv4 = config.last(AwsSigv4).cloned();
        request.oauth2_bearer = config.last(Oauth2Bearer).cloned();
        request.delegation = config.last(Delegation).cloned();
        if let Some(token) = &request.oauth2_bearer {
            if request.auth_type == AuthType::Bearer {
                request
                    .headers
                    .set_if_missing("Authorization", token.prepend_str("Bearer "));
            }
        }
    }

    fn netrc(&self) -> Option<Netrc> {
        let config = self.config;
        if config.enabled(CurlOption::Netrc) || config.has(NetrcFile) {
            Some(Netrc::Required)
        } else if config.enabled(NetrcOptional) {
            Some(Netrc::Optional)
        } else if config.flag(CurlOption::Netrc) == Some(false)
            || config.flag(NetrcOptional) == Some(false)
        {
            Some(Netrc::Ignored)
        } else {
            None
        }
    }

    fn proxy(&mut self) -> Option<Proxy> {
        let config = self.config;
        let invocation = config.last_of(&[CurlOption::Proxy, Proxy1_0, Socks4, Socks4a, Socks5, Socks5Hostname])?;
        let url = invocation.value.as_value()?.clone();
        let mut kind = match invocation.option {
            Proxy1_0 => ProxyKind::Http1,
            Socks4 => ProxyKind::Socks4,
            Socks4a => ProxyKind::Socks4a,
            Socks5 => ProxyKind::Socks5,
            Socks5Hostname => ProxyKind::Socks5Hostname,
            _ => proxy_kind_of(&url),
        };
        if kind == ProxyKind::Http && config.enabled(ProxyHttp2) {
            kind = ProxyKind::Http2;
        }

        let mut auth_type = AuthType::Basic;
        if let Some(invocation) = config
            .invocations()
            .iter()
            .filter(|i| i.value != OptValue::Bool(false))
            .filter(|i| PROXY_AUTH_OPTIONS.iter().any(|(o, _)| *o == i.option))
            .last()
        {
            if let Some((_, t)) = PROXY_AUTH_OPTIONS.iter().find(|(o, _)| *o == invocation.option) {
                auth_type = *t;
            }
        }

        Some(Proxy {
            url,
            kind,
            auth: config.last(ProxyUser).map(split_user),
            auth_type,
            headers: Headers::from_args(config.values(ProxyHeader), "--proxy-header", self.warnings),
            tunnel: config.enabled(Proxytunnel),
            insecure: config.enabled(ProxyInsecure),
            cacert: config.last(ProxyCacert).cloned(),
        })
    }

    fn tls(&mut self) -> Tls {
        let config = self.config;
        let mut tls = Tls {
            insecure: config.enabled(Insecure),
            min_version: config
                .last_of(&[Tlsv1, Tlsv1_0, Tlsv1_1, Tlsv1_2, Tlsv1_3])
                .map(|i| match i.option {
                    Tlsv1 => "1",
                    Tlsv1_0 => "1.0",
                    Tlsv1_1 => "1.1",
                    Tlsv1_2 => "1.2",
                    _ => "1.3",
                })
                .map(str::to_string),
            max_version: config.last(TlsMax).cloned(),
            key: config.last(Key).cloned(),
            key_type: config.last(KeyType).cloned(),
            key_password: config.last(Pass).cloned(),
            cacert: config.last(Cacert).cloned(),
            capath: config.last(Capath).cloned(),
            ca_native: config.enabled(CaNative),
            crlfile: config.last(Crlfile).cloned(),
            pinned_pubkey: config.last(Pinnedpubkey).cloned(),
            ciphers: config.last(Ciphers).cloned(),
            tls13_ciphers: config.last(Tls13Ciphers).cloned(),
            curves: config.last(Curves).cloned(),
            cert_status: config.enabled(CertStatus),
            hsts: config.last(Hsts).cloned(),
            ..Default::default()
        };
        if let Some(cert) = config.last(Cert) {
            let (path, password) = split_cert(cert);
            tls.cert = Some(path);
            tls.cert_password = password;
        }
        if let Some(cert_type) = config.last(CertType) {
            if let Some(literal) = cert_type.as_literal() {
                if !CERT_TYPES.contains(&literal.to_uppercase().as_str()) {
                    self.warnings.push(
                        "cert-type-unknown",
                        format!("--cert-type {literal:?} is not one of PEM, DER, ENG or P12"),
                    );
                }
            }
            tls.cert_type = Some(cert_type.clone());
        }
        tls
    }

    fn number<T>(
        &mut self,
        option: CurlOption,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<Numeric<T>> {
        let value = self.config.last(option)?;
        let Some(literal) = value.as_literal() else {
            return Some(Numeric::Raw(value.clone()));
        };
        match parse(literal) {
            Some(n) => Some(Numeric::Parsed(n)),
            None => {
                self.warnings.push(
                    "not-a-number",
                    format!("{option} {literal:?} is not a valid number"),
                );
                Some(Numeric::Raw(value.clone()))
            }
        }
    }

    fn timeouts(&mut self) -> Timeouts {
        Timeouts {
            max_time: self.number(MaxTime, parse_seconds),
            connect_timeout: self.number(ConnectTimeout, parse_seconds),
            expect100_timeout: self.number(Expect100Timeout, parse_seconds),
            happy_eyeballs_timeout: self.number(HappyEyeballsTimeoutMs, |ms| {
                parse_integer(ms).filter(|ms| *ms >= 0).map(|ms| ms as f64 / 1000.0)
            }),
            keepalive_time: self.number(KeepaliveTime, parse_seconds),
            speed_limit: self.number(SpeedLimit, parse_size),
            speed_time: self.number(SpeedTime, parse_seconds),
        }
    }

    fn retry(&mut self) -> Retry {
        Retry {
            count: self.number(CurlOption::Retry, parse_integer),
            delay: self.number(RetryDelay, parse_seconds),
            max_time: self.number(RetryMaxTime, parse_seconds),
            connrefused: self.config.enabled(RetryConnrefused),
            all_errors: self.config.enabled(RetryAllErrors),
        }
    }

    fn redirects(&mut self) -> Redirects {
        let config = self.config;
        Redirects {
            follow: config.enabled(Location) || config.enabled(LocationTrusted),
            trusted: config.enabled(LocationTrusted),
            max: self.number(MaxRedirs, parse_integer),
            post301: config.enabled(Post301),
            post302: config.enabled(Post302),
            post303: config.enabled(Post303),
        }
    }

    fn connection(&mut self) -> Connection {
        let config = self.config;
        Connection {
            ipv4: config.enabled(Ipv4),
            ipv6: config.enabled(Ipv6),
            interface: config.last(Interface).cloned(),
            local_port: self.number(LocalPort, parse_port_range),
            unix_socket: config.last(UnixSocket).cloned(),
            abstract_unix_socket: config.last(AbstractUnixSocket).cloned(),
            resolve: config.values(Resolve).cloned().collect(),
            connect_to: config.values(ConnectTo).cloned().collect(),
            keepalive: config.flag(Keepalive),
            tcp_nodelay: config.flag(TcpNodelay),
            limit_rate: self.number(LimitRate, parse_size),
            max_filesize: self.number(MaxFilesize, parse_size),
            doh_url: config.last(DohUrl).cloned(),
        }
    }
}

/// `user:password`. A missing password is empty, like curl without a prompt.
fn split_user(user: &ArgValue) -> (ArgValue, ArgValue) {
    user.split_once(":")
        .unwrap_or_else(|| (user.clone(), ArgValue::new()))
}

/// `--cert file:password`. `\:` escapes a colon in the file name, and a
/// `pkcs11:` URI is never split.
fn split_cert(cert: &ArgValue) -> (ArgValue, Option<ArgValue>) {
    if cert.starts_with("pkcs11:") {
        return (cert.clone(), None);
    }
    let mut from = 0;
    while let Some(at) = cert.find_from(":", from) {
        let escaped = at > 0 && cert.get(at - 1) == Some(Piece::Char('\\'));
        let drive = at == 1 && matches!(cert.get(2), Some(Piece::Char('\\' | '/')));
        if !escaped && !drive {
            let path = cert.slice(0, at).replace("\\:", ":");
            return (path, Some(cert.slice_from(at + 1)));
        }
        from = at + 1;
    }
    (cert.replace("\\:", ":"), None)
}

fn proxy_kind_of(url: &ArgValue) -> ProxyKind {
    let scheme = url
        .as_literal()
        .and_then(|u| u.split_once("://"))
        .map(|(scheme, _)| scheme.to_lowercase());
    match scheme.as_deref() {
        Some("socks4") => ProxyKind::Socks4,
        Some("socks4a") => ProxyKind::Socks4a,
        Some("socks5") => ProxyKind::Socks5,
        Some("socks5h") => ProxyKind::Socks5Hostname,
        _ => ProxyKind::Http,
    }
}
