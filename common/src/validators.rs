use regex::Regex;
use serde_yaml::Value;

use crate::error::ValidationError;

lazy_static::lazy_static! {
    static ref RFC1123_LABEL: Regex = Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").unwrap();
    static ref RFC1123_SUBDOMAIN: Regex =
        Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$").unwrap();
    static ref CIDR: Regex =
        Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})(/(\d{1,2}))?$").unwrap();
}

/// A check applied to a value resolved from a cluster api document.
pub type Validator = fn(&Value) -> Result<(), ValidationError>;

/// A closed set of string values accepted at some place in a cluster api document.
pub trait Enumeration: Sized + Copy {
    /// Human readable name used in error messages
    const KIND: &'static str;
    /// Every accepted spelling, in declaration order
    const VALUES: &'static [&'static str];

    fn as_str(&self) -> &'static str;
    fn parse(s: &str) -> Option<Self>;
}

/// Renders scalars the way they were written, so errors show the offending input.
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_owned(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_default(),
    }
}

fn as_str<'a>(value: &'a Value, expected: &'static str) -> Result<&'a str, ValidationError> {
    value.as_str().ok_or_else(|| ValidationError::Type {
        expected,
        value: display(value),
    })
}

pub fn string(value: &Value) -> Result<(), ValidationError> {
    as_str(value, "a string").map(|_| ())
}

pub fn rfc1123_label(value: &Value) -> Result<(), ValidationError> {
    let s = as_str(value, "an RFC1123 label")?;
    if !RFC1123_LABEL.is_match(s) {
        return Err(ValidationError::Label(s.to_owned()));
    }
    Ok(())
}

pub fn rfc1123_subdomain(value: &Value) -> Result<(), ValidationError> {
    let s = as_str(value, "an RFC1123 subdomain")?;
    if !RFC1123_SUBDOMAIN.is_match(s) {
        return Err(ValidationError::Subdomain(s.to_owned()));
    }
    Ok(())
}

fn check_cidr(s: &str) -> Result<(), ValidationError> {
    let err = || ValidationError::Cidr(s.to_owned());
    let caps = CIDR.captures(s).ok_or_else(err)?;
    for i in 1..=4 {
        let octet = &caps[i];
        // no leading zeros, 0..=255
        if (octet.len() > 1 && octet.starts_with('0')) || octet.parse::<u16>().map_err(|_| err())? > 255 {
            return Err(err());
        }
    }
    if let Some(prefix) = caps.get(6) {
        let p = prefix.as_str();
        if (p.len() > 1 && p.starts_with('0')) || p.parse::<u8>().map_err(|_| err())? > 32 {
            return Err(err());
        }
    }
    Ok(())
}

pub fn cidr(value: &Value) -> Result<(), ValidationError> {
    check_cidr(as_str(value, "a CIDR block")?)
}

/// Accepts either a single CIDR block or a sequence of them.
pub fn cidrs(value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Sequence(blocks) => blocks.iter().try_for_each(cidr),
        single => cidr(single),
    }
}

/// Parses integers written either as YAML numbers or as numeric strings.
pub fn to_integer(value: &Value) -> Result<i64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ValidationError::Integer(display(value)))
}

pub fn integer(value: &Value) -> Result<(), ValidationError> {
    to_integer(value).map(|_| ())
}

pub fn positive_integer(value: &Value) -> Result<(), ValidationError> {
    if to_integer(value)? < 1 {
        return Err(ValidationError::Integer(display(value)));
    }
    Ok(())
}

pub fn one_of<T: Enumeration>(value: &Value) -> Result<(), ValidationError> {
    let s = as_str(value, T::KIND)?;
    if T::parse(s).is_none() {
        return Err(ValidationError::NotAllowed {
            kind: T::KIND,
            value: s.to_owned(),
            allowed: T::VALUES,
        });
    }
    Ok(())
}

/// A non-empty sequence where every entry is one of `T`'s values.
pub fn all_of<T: Enumeration>(value: &Value) -> Result<(), ValidationError> {
    let items = value.as_sequence().ok_or_else(|| ValidationError::Type {
        expected: "a list",
        value: display(value),
    })?;
    if items.is_empty() {
        return Err(ValidationError::Type {
            expected: "a non-empty list",
            value: display(value),
        });
    }
    items.iter().try_for_each(one_of::<T>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubeadm::{NetworkAddon, Role};

    fn s(v: &str) -> Value {
        Value::String(v.to_owned())
    }

    #[test]
    fn labels() {
        assert!(rfc1123_label(&s("kubeadm")).is_ok());
        assert!(rfc1123_label(&s("k8s-1")).is_ok());
        assert!(rfc1123_label(&s("a")).is_ok());
        assert_eq!(rfc1123_label(&s("-lead")), Err(ValidationError::Label("-lead".into())));
        assert!(rfc1123_label(&s("trail-")).is_err());
        assert!(rfc1123_label(&s("Upper")).is_err());
        assert!(rfc1123_label(&s("has.dot")).is_err());
        assert!(rfc1123_label(&s("")).is_err());
        assert!(matches!(
            rfc1123_label(&Value::from(12)),
            Err(ValidationError::Type { .. })
        ));
    }

    #[test]
    fn subdomains() {
        assert!(rfc1123_subdomain(&s("cluster.local")).is_ok());
        assert!(rfc1123_subdomain(&s("my-domain.example.com")).is_ok());
        assert!(rfc1123_subdomain(&s("local")).is_ok());
        assert!(rfc1123_subdomain(&s("cluster..local")).is_err());
        assert!(rfc1123_subdomain(&s(".local")).is_err());
        assert!(rfc1123_subdomain(&s("cluster.local.")).is_err());
    }

    #[test]
    fn cidr_blocks() {
        assert!(cidr(&s("10.0.0.0/24")).is_ok());
        assert!(cidr(&s("192.168.0.0/16")).is_ok());
        assert!(cidr(&s("0.0.0.0/0")).is_ok());
        assert!(cidr(&s("10.96.0.10")).is_ok());
        assert!(cidr(&s("255.255.255.255/32")).is_ok());
        assert_eq!(cidr(&s("10.0.0/24")), Err(ValidationError::Cidr("10.0.0/24".into())));
        assert!(cidr(&s("10.0.0.256/24")).is_err());
        assert!(cidr(&s("10.0.0.0/33")).is_err());
        assert!(cidr(&s("10.0.0.0/")).is_err());
        assert!(cidr(&s("010.0.0.0/8")).is_err());
    }

    #[test]
    fn cidr_lists() {
        let ok: Value = serde_yaml::from_str("[10.244.0.0/16, 10.245.0.0/16]").unwrap();
        assert!(cidrs(&ok).is_ok());
        assert!(cidrs(&s("10.244.0.0/16")).is_ok());
        let bad: Value = serde_yaml::from_str("[10.244.0.0/16, 10.245.0/16]").unwrap();
        assert_eq!(cidrs(&bad), Err(ValidationError::Cidr("10.245.0/16".into())));
    }

    #[test]
    fn strings() {
        assert!(string(&s("v1.10.3")).is_ok());
        assert_eq!(
            string(&Value::from(1.1)),
            Err(ValidationError::Type {
                expected: "a string",
                value: "1.1".to_owned()
            })
        );
    }

    #[test]
    fn integers() {
        assert!(integer(&Value::from(3)).is_ok());
        assert!(integer(&s("42")).is_ok());
        assert!(integer(&s("-1")).is_ok());
        assert!(integer(&s("two")).is_err());
        assert!(integer(&Value::from(1.5)).is_err());
        assert!(positive_integer(&s("1")).is_ok());
        assert!(positive_integer(&Value::from(0)).is_err());
    }

    #[test]
    fn enumerations() {
        assert!(one_of::<NetworkAddon>(&s("calico")).is_ok());
        let err = one_of::<NetworkAddon>(&s("cilium")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid network add-on 'cilium'. Valid values are weavenet, flannel, calico"
        );

        let roles: Value = serde_yaml::from_str("[Master, Etcd]").unwrap();
        assert!(all_of::<Role>(&roles).is_ok());
        let roles: Value = serde_yaml::from_str("[Master, Worker]").unwrap();
        assert!(all_of::<Role>(&roles).is_err());
        let roles: Value = serde_yaml::from_str("[]").unwrap();
        assert!(all_of::<Role>(&roles).is_err());
        assert!(all_of::<Role>(&s("Master")).is_err());
    }
}
