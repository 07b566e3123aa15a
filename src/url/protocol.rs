use std::fmt;

use serde::{Serialize, Serializer};

/// URL schemes curl can talk. Anything else is kept as [`Scheme::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
    Ftp,
    Ftps,
    Sftp,
    Scp,
    Tftp,
    Telnet,
    Dict,
    Ldap,
    Ldaps,
    File,
    Mqtt,
    Ws,
    Wss,
    Other(String),
}

impl Scheme {
    pub fn as_str(&self) -> &str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Ftp => "ftp",
            Scheme::Ftps => "ftps",
            Scheme::Sftp => "sftp",
            Scheme::Scp => "scp",
            Scheme::Tftp => "tftp",
            Scheme::Telnet => "telnet",
            Scheme::Dict => "dict",
            Scheme::Ldap => "ldap",
            Scheme::Ldaps => "ldaps",
            Scheme::File => "file",
            Scheme::Mqtt => "mqtt",
            Scheme::Ws => "ws",
            Scheme::Wss => "wss",
            Scheme::Other(s) => s,
        }
    }
}

impl From<&str> for Scheme {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            "ftp" => Scheme::Ftp,
            "ftps" => Scheme::Ftps,
            "sftp" => Scheme::Sftp,
            "scp" => Scheme::Scp,
            "tftp" => Scheme::Tftp,
            "telnet" => Scheme::Telnet,
            "dict" => Scheme::Dict,
            "ldap" => Scheme::Ldap,
            "ldaps" => Scheme::Ldaps,
            "file" => Scheme::File,
            "mqtt" => Scheme::Mqtt,
            "ws" => Scheme::Ws,
            "wss" => Scheme::Wss,
            other => Scheme::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Scheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
