use convert_case::{Case, Casing};

/// Initialisms rewritten to title case before db-name splitting.
/// Earlier entries win when several match at the same position.
const COMMON_INITIALISMS: &[&str] = &[
    "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP", "JSON",
    "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SSH", "TLS", "TTL", "UID", "UI", "UUID",
    "URI", "URL", "UTF8", "VM", "XML", "XSRF", "XSS",
];

///
/// camel_case
///
/// Protobuf-style CamelCase: words are split on `_` followed by a lower-case
/// letter or on upper-case letters, digits are kept as their own words, and a
/// leading underscore becomes `X`.
///

#[must_use]
pub fn camel_case(s: &str) -> String {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    if bytes[0] == b'_' {
        out.push('X');
        i += 1;
    }

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'_' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_lowercase() {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() {
            out.push(c as char);
            i += 1;
            continue;
        }

        out.push(c.to_ascii_uppercase() as char);
        while i + 1 < bytes.len() && bytes[i + 1].is_ascii_lowercase() {
            i += 1;
            out.push(bytes[i] as char);
        }
        i += 1;
    }

    out
}

///
/// to_db_name
///
/// Column/table casing used by the relational layer: `AccountID` becomes
/// `account_id`, `HTTPServer` becomes `http_server`.
///

#[must_use]
pub fn to_db_name(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let value = replace_initialisms(name);
    let bytes = value.as_bytes();
    let n = bytes.len();
    let mut buf = String::with_capacity(n + 4);

    let mut last_case = false;
    let mut curr_case = false;
    for i in 0..n - 1 {
        let v = bytes[i] as char;
        let next_case = bytes[i + 1].is_ascii_uppercase();
        let next_number = bytes[i + 1].is_ascii_digit();

        if i > 0 {
            if curr_case {
                if last_case && (next_case || next_number) {
                    buf.push(v);
                } else {
                    if bytes[i - 1] != b'_' && bytes[i + 1] != b'_' {
                        buf.push('_');
                    }
                    buf.push(v);
                }
            } else {
                buf.push(v);
                if i == n - 2 && next_case && !next_number {
                    buf.push('_');
                }
            }
        } else {
            curr_case = true;
            buf.push(v);
        }

        last_case = curr_case;
        curr_case = next_case;
    }
    buf.push(bytes[n - 1] as char);

    buf.to_lowercase()
}

/// Snake-case a name for use as a Rust identifier (fields, functions, methods).
#[must_use]
pub fn rust_ident_case(name: &str) -> String {
    name.to_case(Case::Snake)
}

// replace_initialisms
// scan left to right, first listed initialism wins at each position
fn replace_initialisms(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;

    'scan: while !rest.is_empty() {
        for initialism in COMMON_INITIALISMS {
            if let Some(tail) = rest.strip_prefix(initialism) {
                let mut chars = initialism.chars();
                if let Some(first) = chars.next() {
                    out.push(first);
                    out.extend(chars.map(|c| c.to_ascii_lowercase()));
                }
                rest = tail;
                continue 'scan;
            }
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}

///
/// TESTS
///
