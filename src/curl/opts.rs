//! The registry of curl's command line options.
//!
//! Every option curl accepts is one [`CurlOption`] variant. Aliases, `--no-` forms,
//! short flags and unambiguous prefixes all resolve to the same variant through
//! [`OPTION_TABLE`], which is built once and only read afterwards.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    ops::Bound,
    sync::LazyLock,
};

use serde::{Serialize, Serializer};

use crate::error::{CurlError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Bool,
    Value,
}

mod flags {
    /// Accepts `--no-NAME`.
    pub const NEG: u8 = 1;
    /// Every occurrence is kept, in order.
    pub const LIST: u8 = 1 << 1;
    /// Applies to all `--next` sections.
    pub const GLOBAL: u8 = 1 << 2;
}

use flags::{GLOBAL, LIST, NEG};

macro_rules! curl_options {
    ($( $variant:ident => $name:literal : $kind:ident $(, $flags:expr)? ; )+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum CurlOption {
            $( $variant, )+
        }

        impl CurlOption {
            pub const ALL: &'static [CurlOption] = &[ $( CurlOption::$variant, )+ ];

            /// Canonical long name, without the leading dashes.
            pub fn name(self) -> &'static str {
                match self {
                    $( CurlOption::$variant => $name, )+
                }
            }

            pub fn kind(self) -> ArgKind {
                match self {
                    $( CurlOption::$variant => ArgKind::$kind, )+
                }
            }

            fn flags(self) -> u8 {
                match self {
                    $( CurlOption::$variant => 0 $( | $flags )?, )+
                }
            }
        }
    };
}

curl_options! {
    Url => "url": Value, LIST;
    DnsIpv4Addr => "dns-ipv4-addr": Value;
    DnsIpv6Addr => "dns-ipv6-addr": Value;
    RandomFile => "random-file": Value;
    EgdFile => "egd-file": Value;
    Oauth2Bearer => "oauth2-bearer": Value;
    ConnectTimeout => "connect-timeout": Value;
    DohUrl => "doh-url": Value;
    Ciphers => "ciphers": Value;
    DnsInterface => "dns-interface": Value;
    DisableEpsv => "disable-epsv": Bool, NEG;
    DisallowUsernameInUrl => "disallow-username-in-url": Bool, NEG;
    Epsv => "epsv": Bool, NEG;
    DnsServers => "dns-servers": Value;
    Trace => "trace": Value, GLOBAL;
    Npn => "npn": Bool, NEG;
    TraceAscii => "trace-ascii": Value, GLOBAL;
    Alpn => "alpn": Bool, NEG;
    LimitRate => "limit-rate": Value;
    Rate => "rate": Value;
    Compressed => "compressed": Bool, NEG;
    TrEncoding => "tr-encoding": Bool, NEG;
    Digest => "digest": Bool, NEG;
    Negotiate => "negotiate": Bool, NEG;
    Ntlm => "ntlm": Bool, NEG;
    NtlmWb => "ntlm-wb": Bool, NEG;
    Basic => "basic": Bool, NEG;
    Anyauth => "anyauth": Bool, NEG;
    Wdebug => "wdebug": Bool, NEG;
    FtpCreateDirs => "ftp-create-dirs": Bool, NEG;
    CreateDirs => "create-dirs": Bool, NEG;
    CreateFileMode => "create-file-mode": Value;
    MaxRedirs => "max-redirs": Value;
    ProxyNtlm => "proxy-ntlm": Bool, NEG;
    Crlf => "crlf": Bool, NEG;
    Stderr => "stderr": Value, GLOBAL;
    AwsSigv4 => "aws-sigv4": Value;
    Interface => "interface": Value;
    Krb => "krb": Value;
    HaproxyProtocol => "haproxy-protocol": Bool, NEG;
    HaproxyClientip => "haproxy-clientip": Value;
    MaxFilesize => "max-filesize": Value;
    DisableEprt => "disable-eprt": Bool, NEG;
    Eprt => "eprt": Bool, NEG;
    Xattr => "xattr": Bool, NEG;
    Ssl => "ssl": Bool, NEG;
    FtpPasv => "ftp-pasv": Bool, NEG;
    Socks5 => "socks5": Value;
    TcpNodelay => "tcp-nodelay": Bool, NEG;
    ProxyDigest => "proxy-digest": Bool, NEG;
    ProxyBasic => "proxy-basic": Bool, NEG;
    Retry => "retry": Value;
    RetryConnrefused => "retry-connrefused": Bool, NEG;
    RetryDelay => "retry-delay": Value;
    RetryMaxTime => "retry-max-time": Value;
    ProxyNegotiate => "proxy-negotiate": Bool, NEG;
    FormEscape => "form-escape": Bool, NEG;
    FtpAccount => "ftp-account": Value;
    ProxyAnyauth => "proxy-anyauth": Bool, NEG;
    TraceTime => "trace-time": Bool, NEG | GLOBAL;
    IgnoreContentLength => "ignore-content-length": Bool, NEG;
    FtpSkipPasvIp => "ftp-skip-pasv-ip": Bool, NEG;
    FtpMethod => "ftp-method": Value;
    LocalPort => "local-port": Value;
    Socks4 => "socks4": Value;
    Socks4a => "socks4a": Value;
    FtpAlternativeToUser => "ftp-alternative-to-user": Value;
    SslReqd => "ssl-reqd": Bool, NEG;
    Sessionid => "sessionid": Bool, NEG;
    FtpSslControl => "ftp-ssl-control": Bool, NEG;
    FtpSslCcc => "ftp-ssl-ccc": Bool, NEG;
    FtpSslCccMode => "ftp-ssl-ccc-mode": Value;
    Libcurl => "libcurl": Value, GLOBAL;
    Raw => "raw": Bool, NEG;
    Post301 => "post301": Bool, NEG;
    Keepalive => "keepalive": Bool, NEG;
    Socks5Hostname => "socks5-hostname": Value;
    KeepaliveTime => "keepalive-time": Value;
    Post302 => "post302": Bool, NEG;
    Noproxy => "noproxy": Value;
    Socks5GssapiNec => "socks5-gssapi-nec": Bool, NEG;
    Proxy1_0 => "proxy1.0": Value;
    TftpBlksize => "tftp-blksize": Value;
    MailFrom => "mail-from": Value;
    MailRcpt => "mail-rcpt": Value, LIST;
    FtpPret => "ftp-pret": Bool, NEG;
    Proto => "proto": Value;
    ProtoRedir => "proto-redir": Value;
    Resolve => "resolve": Value, LIST;
    Delegation => "delegation": Value;
    MailAuth => "mail-auth": Value;
    Post303 => "post303": Bool, NEG;
    Metalink => "metalink": Bool, NEG;
    SaslAuthzid => "sasl-authzid": Value;
    SaslIr => "sasl-ir": Bool, NEG;
    TestEvent => "test-event": Bool, NEG | GLOBAL;
    UnixSocket => "unix-socket": Value;
    PathAsIs => "path-as-is": Bool, NEG;
    ProxyServiceName => "proxy-service-name": Value;
    ServiceName => "service-name": Value;
    ProtoDefault => "proto-default": Value;
    Expect100Timeout => "expect100-timeout": Value;
    TftpNoOptions => "tftp-no-options": Bool, NEG;
    ConnectTo => "connect-to": Value, LIST;
    AbstractUnixSocket => "abstract-unix-socket": Value;
    TlsMax => "tls-max": Value;
    SuppressConnectHeaders => "suppress-connect-headers": Bool, NEG;
    CompressedSsh => "compressed-ssh": Bool, NEG;
    HappyEyeballsTimeoutMs => "happy-eyeballs-timeout-ms": Value;
    RetryAllErrors => "retry-all-errors": Bool, NEG;
    TraceIds => "trace-ids": Bool, NEG;
    Http1_0 => "http1.0": Bool;
    Http1_1 => "http1.1": Bool;
    Http2 => "http2": Bool;
    Http2PriorKnowledge => "http2-prior-knowledge": Bool;
    Http3 => "http3": Bool;
    Http3Only => "http3-only": Bool;
    Http0_9 => "http0.9": Bool, NEG;
    ProxyHttp2 => "proxy-http2": Bool, NEG;
    Tlsv1 => "tlsv1": Bool;
    Tlsv1_0 => "tlsv1.0": Bool;
    Tlsv1_1 => "tlsv1.1": Bool;
    Tlsv1_2 => "tlsv1.2": Bool;
    Tlsv1_3 => "tlsv1.3": Bool;
    Tls13Ciphers => "tls13-ciphers": Value;
    ProxyTls13Ciphers => "proxy-tls13-ciphers": Value;
    Sslv2 => "sslv2": Bool;
    Sslv3 => "sslv3": Bool;
    Ipv4 => "ipv4": Bool;
    Ipv6 => "ipv6": Bool;
    Append => "append": Bool, NEG;
    UserAgent => "user-agent": Value;
    Cookie => "cookie": Value, LIST;
    AltSvc => "alt-svc": Value;
    Hsts => "hsts": Value, LIST;
    UseAscii => "use-ascii": Bool, NEG;
    CookieJar => "cookie-jar": Value;
    ContinueAt => "continue-at": Value;
    Data => "data": Value, LIST;
    DataRaw => "data-raw": Value, LIST;
    DataAscii => "data-ascii": Value, LIST;
    DataBinary => "data-binary": Value, LIST;
    DataUrlencode => "data-urlencode": Value, LIST;
    Json => "json": Value, LIST;
    UrlQuery => "url-query": Value, LIST;
    DumpHeader => "dump-header": Value;
    Referer => "referer": Value;
    Cert => "cert": Value;
    Cacert => "cacert": Value;
    CertType => "cert-type": Value;
    Key => "key": Value;
    KeyType => "key-type": Value;
    Pass => "pass": Value;
    Engine => "engine": Value;
    CaNative => "ca-native": Bool, NEG;
    ProxyCaNative => "proxy-ca-native": Bool, NEG;
    Capath => "capath": Value;
    Pubkey => "pubkey": Value;
    Hostpubmd5 => "hostpubmd5": Value;
    Hostpubsha256 => "hostpubsha256": Value;
    Crlfile => "crlfile": Value;
    Tlsuser => "tlsuser": Value;
    Tlspassword => "tlspassword": Value;
    Tlsauthtype => "tlsauthtype": Value;
    SslAllowBeast => "ssl-allow-beast": Bool, NEG;
    SslAutoClientCert => "ssl-auto-client-cert": Bool, NEG;
    ProxySslAutoClientCert => "proxy-ssl-auto-client-cert": Bool, NEG;
    Pinnedpubkey => "pinnedpubkey": Value;
    ProxyPinnedpubkey => "proxy-pinnedpubkey": Value;
    CertStatus => "cert-status": Bool, NEG;
    DohCertStatus => "doh-cert-status": Bool, NEG;
    FalseStart => "false-start": Bool, NEG;
    SslNoRevoke => "ssl-no-revoke": Bool, NEG;
    SslRevokeBestEffort => "ssl-revoke-best-effort": Bool, NEG;
    TcpFastopen => "tcp-fastopen": Bool, NEG;
    ProxyTlsuser => "proxy-tlsuser": Value;
    ProxyTlspassword => "proxy-tlspassword": Value;
    ProxyTlsauthtype => "proxy-tlsauthtype": Value;
    ProxyCert => "proxy-cert": Value;
    ProxyCertType => "proxy-cert-type": Value;
    ProxyKey => "proxy-key": Value;
    ProxyKeyType => "proxy-key-type": Value;
    ProxyPass => "proxy-pass": Value;
    ProxyCiphers => "proxy-ciphers": Value;
    ProxyCrlfile => "proxy-crlfile": Value;
    ProxySslAllowBeast => "proxy-ssl-allow-beast": Bool, NEG;
    LoginOptions => "login-options": Value;
    ProxyCacert => "proxy-cacert": Value;
    ProxyCapath => "proxy-capath": Value;
    ProxyInsecure => "proxy-insecure": Bool, NEG;
    ProxyTlsv1 => "proxy-tlsv1": Bool;
    Socks5Basic => "socks5-basic": Bool, NEG;
    Socks5Gssapi => "socks5-gssapi": Bool, NEG;
    EtagSave => "etag-save": Value;
    EtagCompare => "etag-compare": Value;
    Curves => "curves": Value;
    Fail => "fail": Bool, NEG;
    FailEarly => "fail-early": Bool, NEG | GLOBAL;
    StyledOutput => "styled-output": Bool, NEG | GLOBAL;
    MailRcptAllowfails => "mail-rcpt-allowfails": Bool, NEG;
    FailWithBody => "fail-with-body": Bool, NEG;
    RemoveOnError => "remove-on-error": Bool, NEG;
    Form => "form": Value, LIST;
    FormString => "form-string": Value, LIST;
    Globoff => "globoff": Bool, NEG;
    Get => "get": Bool, NEG;
    RequestTarget => "request-target": Value;
    Help => "help": Bool, NEG | GLOBAL;
    Header => "header": Value, LIST;
    ProxyHeader => "proxy-header": Value, LIST;
    Include => "include": Bool, NEG;
    Head => "head": Bool, NEG;
    JunkSessionCookies => "junk-session-cookies": Bool, NEG;
    RemoteHeaderName => "remote-header-name": Bool, NEG;
    Insecure => "insecure": Bool, NEG;
    DohInsecure => "doh-insecure": Bool, NEG;
    Config => "config": Value, GLOBAL;
    ListOnly => "list-only": Bool, NEG;
    Location => "location": Bool, NEG;
    LocationTrusted => "location-trusted": Bool, NEG;
    MaxTime => "max-time": Value;
    Manual => "manual": Bool, NEG;
    Netrc => "netrc": Bool, NEG;
    NetrcOptional => "netrc-optional": Bool, NEG;
    NetrcFile => "netrc-file": Value;
    Buffer => "buffer": Bool, NEG;
    Output => "output": Value, LIST;
    RemoteName => "remote-name": Bool, NEG;
    RemoteNameAll => "remote-name-all": Bool, NEG;
    OutputDir => "output-dir": Value;
    Clobber => "clobber": Bool, NEG;
    Proxytunnel => "proxytunnel": Bool, NEG;
    FtpPort => "ftp-port": Value;
    Disable => "disable": Bool, NEG;
    Quote => "quote": Value, LIST;
    Range => "range": Value;
    RemoteTime => "remote-time": Bool, NEG;
    Silent => "silent": Bool, NEG | GLOBAL;
    ShowError => "show-error": Bool, NEG | GLOBAL;
    TelnetOption => "telnet-option": Value, LIST;
    UploadFile => "upload-file": Value, LIST;
    User => "user": Value;
    ProxyUser => "proxy-user": Value;
    Verbose => "verbose": Bool, NEG | GLOBAL;
    Version => "version": Bool, NEG | GLOBAL;
    WriteOut => "write-out": Value;
    Proxy => "proxy": Value;
    Preproxy => "preproxy": Value;
    Request => "request": Value;
    SpeedLimit => "speed-limit": Value;
    SpeedTime => "speed-time": Value;
    TimeCond => "time-cond": Value;
    Parallel => "parallel": Bool, NEG | GLOBAL;
    ParallelMax => "parallel-max": Value, GLOBAL;
    ParallelImmediate => "parallel-immediate": Bool, NEG | GLOBAL;
    ProgressBar => "progress-bar": Bool, NEG | GLOBAL;
    ProgressMeter => "progress-meter": Bool, NEG | GLOBAL;
    Next => "next": Bool;
}

impl CurlOption {
    pub fn takes_value(self) -> bool {
        self.kind() == ArgKind::Value
    }

    pub fn negatable(self) -> bool {
        self.flags() & NEG != 0
    }

    pub fn repeatable(self) -> bool {
        self.flags() & LIST != 0
    }

    pub fn global(self) -> bool {
        self.flags() & GLOBAL != 0
    }

    pub fn from_name(name: &str) -> Option<CurlOption> {
        OPTION_TABLE.canonical.get(name).copied()
    }
}

impl fmt::Display for CurlOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{}", self.name())
    }
}

impl Serialize for CurlOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

const ALIASES: &[(&str, CurlOption)] = &[
    ("krb4", CurlOption::Krb),
    ("ftp-ssl", CurlOption::Ssl),
    ("ftp-ssl-reqd", CurlOption::SslReqd),
    ("socks5-gssapi-service", CurlOption::ProxyServiceName),
];

/// Spellings older curl versions accepted. They only match exactly.
const REMOVED: &[(&str, Option<CurlOption>, &str)] = &[
    ("port", None, "7.3"),
    ("ftp-ascii", Some(CurlOption::UseAscii), "7.10.7"),
    ("3p-url", None, "7.16.0"),
    ("3p-user", None, "7.16.0"),
    ("3p-quote", None, "7.16.0"),
    ("http2.0", Some(CurlOption::Http2), "7.36.0"),
    ("telnet-options", Some(CurlOption::TelnetOption), "7.49.0"),
    ("http-request", Some(CurlOption::Request), "7.49.0"),
    ("ftpport", Some(CurlOption::FtpPort), "7.49.0"),
    ("environment", None, "7.54.1"),
];

const SHORT: &[(char, CurlOption, bool)] = &[
    ('0', CurlOption::Http1_0, false),
    ('1', CurlOption::Tlsv1, false),
    ('2', CurlOption::Sslv2, false),
    ('3', CurlOption::Sslv3, false),
    ('4', CurlOption::Ipv4, false),
    ('6', CurlOption::Ipv6, false),
    ('a', CurlOption::Append, false),
    ('A', CurlOption::UserAgent, false),
    ('b', CurlOption::Cookie, false),
    ('B', CurlOption::UseAscii, false),
    ('c', CurlOption::CookieJar, false),
    ('C', CurlOption::ContinueAt, false),
    ('d', CurlOption::Data, false),
    ('D', CurlOption::DumpHeader, false),
    ('e', CurlOption::Referer, false),
    ('E', CurlOption::Cert, false),
    ('f', CurlOption::Fail, false),
    ('F', CurlOption::Form, false),
    ('g', CurlOption::Globoff, false),
    ('G', CurlOption::Get, false),
    ('h', CurlOption::Help, false),
    ('H', CurlOption::Header, false),
    ('i', CurlOption::Include, false),
    ('I', CurlOption::Head, false),
    ('j', CurlOption::JunkSessionCookies, false),
    ('J', CurlOption::RemoteHeaderName, false),
    ('k', CurlOption::Insecure, false),
    ('K', CurlOption::Config, false),
    ('l', CurlOption::ListOnly, false),
    ('L', CurlOption::Location, false),
    ('m', CurlOption::MaxTime, false),
    ('M', CurlOption::Manual, false),
    ('n', CurlOption::Netrc, false),
    ('N', CurlOption::Buffer, true),
    ('o', CurlOption::Output, false),
    ('O', CurlOption::RemoteName, false),
    ('p', CurlOption::Proxytunnel, false),
    ('P', CurlOption::FtpPort, false),
    ('q', CurlOption::Disable, false),
    ('Q', CurlOption::Quote, false),
    ('r', CurlOption::Range, false),
    ('R', CurlOption::RemoteTime, false),
    ('s', CurlOption::Silent, false),
    ('S', CurlOption::ShowError, false),
    ('t', CurlOption::TelnetOption, false),
    ('T', CurlOption::UploadFile, false),
    ('u', CurlOption::User, false),
    ('U', CurlOption::ProxyUser, false),
    ('v', CurlOption::Verbose, false),
    ('V', CurlOption::Version, false),
    ('w', CurlOption::WriteOut, false),
    ('x', CurlOption::Proxy, false),
    ('X', CurlOption::Request, false),
    ('Y', CurlOption::SpeedLimit, false),
    ('y', CurlOption::SpeedTime, false),
    ('z', CurlOption::TimeCond, false),
    ('Z', CurlOption::Parallel, false),
    ('#', CurlOption::ProgressBar, false),
    (':', CurlOption::Next, false),
];

/// Short options that meant something else in older curl versions.
const CHANGED_SHORT: &[(char, &str)] = &[
    ('@', "used to be short for --create-dirs until curl 7.10.7"),
    ('9', "used to be short for --crlf until curl 7.10.8"),
    ('8', "used to be short for --stderr <file> until curl 7.10.8"),
    ('7', "used to be short for --interface <name> until curl 7.10.8"),
    ('5', "used to be another way to specify the url until curl 7.10.8"),
    ('*', "used to be another way to specify the url until curl 7.49.0"),
    ('~', "used to be short for --xattr until curl 7.49.0"),
];

/// What a spelling on the command line resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub option: CurlOption,
    /// Spelled `--no-NAME` (or `-N`).
    pub negated: bool,
    /// Spelled with a name curl removed; the caller should warn.
    pub removed_in: Option<&'static str>,
}

impl Resolved {
    fn new(option: CurlOption, negated: bool) -> Self {
        Self {
            option,
            negated,
            removed_in: None,
        }
    }
}

pub struct OptionTable {
    canonical: HashMap<&'static str, CurlOption>,
    /// Canonical names and aliases, sorted so prefixes are a range scan.
    long: BTreeMap<&'static str, CurlOption>,
    removed: HashMap<&'static str, (Option<CurlOption>, &'static str)>,
    short: HashMap<char, (CurlOption, bool)>,
    changed_short: HashMap<char, &'static str>,
}

pub static OPTION_TABLE: LazyLock<OptionTable> = LazyLock::new(OptionTable::build);

impl OptionTable {
    fn build() -> Self {
        let canonical: HashMap<_, _> = CurlOption::ALL.iter().map(|o| (o.name(), *o)).collect();
        let mut long: BTreeMap<_, _> = canonical.iter().map(|(k, v)| (*k, *v)).collect();
        long.extend(ALIASES.iter().copied());
        Self {
            canonical,
            long,
            removed: REMOVED.iter().map(|(k, o, v)| (*k, (*o, *v))).collect(),
            short: SHORT.iter().map(|(c, o, n)| (*c, (*o, *n))).collect(),
            changed_short: CHANGED_SHORT.iter().copied().collect(),
        }
    }

    pub fn short(&self, c: char) -> Option<Resolved> {
        self.short.get(&c).map(|(option, negated)| Resolved::new(*option, *negated))
    }

    pub fn changed_short(&self, c: char) -> Option<&'static str> {
        self.changed_short.get(&c).copied()
    }

    /// Resolves a long option spelled without its leading `--`.
    ///
    /// Exact names win. Otherwise `no-` is stripped for negatable booleans and the
    /// rest may be any unambiguous prefix, as curl itself allows.
    pub fn lookup_long(&self, spelling: &str) -> Result<Resolved> {
        let dashed = format!("--{spelling}");
        if let Some(option) = self.long.get(spelling) {
            return Ok(Resolved::new(*option, false));
        }
        if let Some((mapped, version)) = self.removed.get(spelling) {
            return match mapped {
                Some(option) => Ok(Resolved {
                    option: *option,
                    negated: false,
                    removed_in: Some(*version),
                }),
                None => Err(CurlError::UnknownOption {
                    option: dashed,
                    hint: Some(format!("removed in curl {version}")),
                }),
            };
        }
        if let Some(rest) = spelling.strip_prefix("no-") {
            let negatable = self.prefix_matches(rest, |o| o.negatable());
            match negatable.as_slice() {
                [(_, option)] => return Ok(Resolved::new(*option, true)),
                [] => {}
                many => return Err(ambiguous(dashed, many, "--no-")),
            }
        }
        let matches = self.prefix_matches(spelling, |_| true);
        match matches.as_slice() {
            [(_, option)] => Ok(Resolved::new(*option, false)),
            [] => Err(CurlError::unknown(dashed)),
            many => Err(ambiguous(dashed, many, "--")),
        }
    }

    /// Distinct options whose name or alias starts with `prefix`.
    fn prefix_matches(
        &self,
        prefix: &str,
        keep: impl Fn(CurlOption) -> bool,
    ) -> Vec<(&'static str, CurlOption)> {
        if prefix.is_empty() {
            return Vec::new();
        }
        if let Some(option) = self.long.get(prefix).filter(|o| keep(**o)) {
            return vec![(option.name(), *option)];
        }
        let mut found: Vec<(&'static str, CurlOption)> = Vec::new();
        for (name, option) in self.long.range::<str, _>((Bound::Included(prefix), Bound::Unbounded)) {
            if !name.starts_with(prefix) {
                break;
            }
            if keep(*option) && !found.iter().any(|(_, o)| o == option) {
                found.push((*name, *option));
            }
        }
        found
    }
}

fn ambiguous(option: String, matches: &[(&str, CurlOption)], dashes: &str) -> CurlError {
    CurlError::AmbiguousOption {
        option,
        candidates: matches.iter().map(|(name, _)| format!("{dashes}{name}")).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("request", CurlOption::Request, false)]
    #[case("verb", CurlOption::Verbose, false)]
    #[case("compressed", CurlOption::Compressed, false)]
    #[case("no-compressed", CurlOption::Compressed, true)]
    #[case("no-keepalive", CurlOption::Keepalive, true)]
    #[case("no-buffer", CurlOption::Buffer, true)]
    #[case("krb4", CurlOption::Krb, false)]
    #[case("ftp-ssl", CurlOption::Ssl, false)]
    #[case("no-ftp-ssl", CurlOption::Ssl, true)]
    #[case("http1.0", CurlOption::Http1_0, false)]
    #[case("data-urlencode", CurlOption::DataUrlencode, false)]
    #[case("data-urlenc", CurlOption::DataUrlencode, false)]
    #[case("noproxy", CurlOption::Noproxy, false)]
    #[case("sil", CurlOption::Silent, false)]
    fn test_lookup_long(#[case] spelling: &str, #[case] option: CurlOption, #[case] negated: bool) {
        let resolved = OPTION_TABLE.lookup_long(spelling).unwrap();
        assert_eq!(resolved.option, option);
        assert_eq!(resolved.negated, negated);
    }

    #[test]
    fn test_lookup_owned_spelling() {
        let spelling = String::from("--compr");
        let resolved = OPTION_TABLE.lookup_long(&spelling[2..]).unwrap();
        assert_eq!(resolved.option, CurlOption::Compressed);
    }

    #[test]
    fn test_ambiguous_prefix() {
        assert!(OPTION_TABLE.lookup_long("req").is_err());
        let err = OPTION_TABLE.lookup_long("dat").unwrap_err();
        let CurlError::AmbiguousOption { option, candidates } = err else {
            panic!("expected an ambiguity error");
        };
        assert_eq!(option, "--dat");
        assert!(candidates.contains(&"--data".to_string()));
        assert!(candidates.contains(&"--data-raw".to_string()));
    }

    #[rstest]
    #[case("frobnicate")]
    #[case("no-request")]
    #[case("no-http1.0")]
    fn test_unknown(#[case] spelling: &str) {
        assert!(matches!(
            OPTION_TABLE.lookup_long(spelling),
            Err(CurlError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_removed_spellings() {
        let resolved = OPTION_TABLE.lookup_long("http-request").unwrap();
        assert_eq!(resolved.option, CurlOption::Request);
        assert_eq!(resolved.removed_in, Some("7.49.0"));
        assert_eq!(
            OPTION_TABLE.lookup_long("port"),
            Err(CurlError::UnknownOption {
                option: "--port".into(),
                hint: Some("removed in curl 7.3".into())
            })
        );
    }

    #[test]
    fn test_short_options() {
        assert_eq!(OPTION_TABLE.short('X').unwrap().option, CurlOption::Request);
        let n = OPTION_TABLE.short('N').unwrap();
        assert_eq!((n.option, n.negated), (CurlOption::Buffer, true));
        assert!(OPTION_TABLE.short('9').is_none());
        assert!(OPTION_TABLE.changed_short('9').is_some());
    }

    #[test]
    fn test_option_metadata() {
        assert_eq!(CurlOption::ALL.len(), 258);
        assert!(CurlOption::Header.repeatable());
        assert!(!CurlOption::Request.repeatable());
        assert!(CurlOption::Verbose.global());
        assert!(CurlOption::Compressed.negatable());
        assert!(!CurlOption::Http2.negatable());
        assert!(CurlOption::Data.takes_value());
        assert_eq!(CurlOption::from_name("proxy1.0"), Some(CurlOption::Proxy1_0));
        assert_eq!(CurlOption::Proxy1_0.to_string(), "--proxy1.0");
    }
}
