use lazy_static::lazy_static;
use regex::Regex;

/// Mask a secret (password, user name, key) suitable for use in logs.
pub fn secret(value: &str) -> String {
    const DEFAULT_MASK: &str = "************";
    if value.len() < 4 || !value.is_char_boundary(4) {
        DEFAULT_MASK.to_string()
    } else {
        format!("{}{}", &value[0..4], DEFAULT_MASK)
    }
}

/// Mask email address suitable for use in logs.
pub fn email(address: &str) -> String {
    const DEFAULT_MASK: &str = "****@******";

    lazy_static! {
        static ref EMAIL_MASK_REGEX: Regex = Regex::new(r"^([^@]*)@(.+)$").unwrap();
    }

    if let Some(captures) = EMAIL_MASK_REGEX.captures(address) {
        match (captures.get(1), captures.get(2)) {
            (Some(address), Some(host)) => {
                let address = address.as_str();
                let host = host.as_str();
                let address = address.chars().next().map(String::from).unwrap_or_default();
                let host: String = if host.chars().count() > 2 {
                    host.chars().skip(host.chars().count() - 2).collect()
                } else {
                    String::new()
                };
                format!("{}{}{}", address, DEFAULT_MASK, host)
            }
            _ => DEFAULT_MASK.to_string(),
        }
    } else {
        DEFAULT_MASK.to_string()
    }
}

/// Hide the password of a connection URL such as `postgres://user:pw@host/db`.
pub fn database_url(url: &str) -> String {
    lazy_static! {
        static ref PASSWORD_REGEX: Regex = Regex::new(r"^([a-z][a-z0-9+.-]*://[^:/@]*):[^@]*@").unwrap();
    }

    PASSWORD_REGEX.replace(url, "$1:****@").to_string()
}
