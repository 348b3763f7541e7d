//! Time-based one-time password descriptor.
//!
//! Codes are a pure function of the seed and a point in time (RFC 6238).

use chrono::{DateTime, TimeZone, Utc};
use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use url::Url;
use zeroize::Zeroizing;

use crate::core::constants;

/// Longest code we will render.
const MAX_DIGITS: u32 = 10;

macro_rules! hmac_digest {
    ($hash:ty, $key:expr, $message:expr) => {
        match Hmac::<$hash>::new_from_slice($key) {
            Ok(mut mac) => {
                mac.update($message);
                mac.finalize().into_bytes().to_vec()
            }
            // HMAC takes keys of any length
            Err(_) => Vec::new(),
        }
    };
}

/// HMAC hash used for code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl Algorithm {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SHA1" => Some(Self::Sha1),
            "SHA256" => Some(Self::Sha256),
            "SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }
}

/// Parameters for generating TOTP codes.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpConfig {
    seed: Zeroizing<Vec<u8>>,
    period: u64,
    digits: u32,
    algorithm: Algorithm,
    issuer: Option<String>,
    account: Option<String>,
}

/// One code and the window it is valid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCode {
    pub code: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl OtpCode {
    /// Whole seconds left in the window as seen from `now`.
    pub fn remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.valid_until - now).num_seconds().max(0)
    }
}

impl OtpConfig {
    /// Build from a base32 seed with default period, digits and algorithm.
    ///
    /// Returns `None` when the seed is empty or not valid base32.
    pub fn from_seed(seed: &str) -> Option<Self> {
        Some(Self {
            seed: decode_seed(seed)?,
            period: constants::DEFAULT_OTP_PERIOD,
            digits: constants::DEFAULT_OTP_DIGITS,
            algorithm: Algorithm::Sha1,
            issuer: None,
            account: None,
        })
    }

    /// Parse an `otpauth://totp/...` URI.
    ///
    /// HOTP URIs, unknown algorithms and out-of-range parameters yield `None`.
    pub fn from_uri(uri: &str) -> Option<Self> {
        let url = Url::parse(uri.trim()).ok()?;
        if !url.scheme().eq_ignore_ascii_case("otpauth") {
            return None;
        }
        if !url.host_str()?.eq_ignore_ascii_case("totp") {
            return None;
        }

        let mut seed = None;
        let mut period = constants::DEFAULT_OTP_PERIOD;
        let mut digits = constants::DEFAULT_OTP_DIGITS;
        let mut algorithm = Algorithm::Sha1;
        let mut issuer = None;

        for (key, value) in url.query_pairs() {
            match key.to_ascii_lowercase().as_str() {
                "secret" => seed = Some(decode_seed(&value)?),
                "period" => period = value.parse().ok().filter(|p| *p > 0)?,
                "digits" => digits = value.parse().ok().filter(|d| (1..=MAX_DIGITS).contains(d))?,
                "algorithm" => algorithm = Algorithm::parse(&value)?,
                "issuer" => issuer = Some(value.into_owned()),
                _ => {}
            }
        }

        let label = decode_label(url.path().trim_start_matches('/'));
        let account = match label.split_once(':') {
            Some((prefix, account)) => {
                if issuer.is_none() && !prefix.trim().is_empty() {
                    issuer = Some(prefix.trim().to_string());
                }
                Some(account.trim().to_string())
            }
            None => Some(label.trim().to_string()),
        }
        .filter(|a| !a.is_empty());

        Some(Self {
            seed: seed?,
            period,
            digits,
            algorithm,
            issuer,
            account,
        })
    }

    /// Render back to an `otpauth://` URI.
    pub fn to_uri(&self) -> String {
        let label = match (&self.issuer, &self.account) {
            (Some(issuer), Some(account)) => format!("{}:{}", issuer, account),
            (None, Some(account)) => account.clone(),
            (Some(issuer), None) => format!("{}:", issuer),
            (None, None) => String::new(),
        };
        let secret = Zeroizing::new(BASE32_NOPAD.encode(&self.seed));

        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("secret", &secret);
        if let Some(issuer) = &self.issuer {
            query.append_pair("issuer", issuer);
        }
        query
            .append_pair("period", &self.period.to_string())
            .append_pair("digits", &self.digits.to_string())
            .append_pair("algorithm", self.algorithm.name());

        let label: String = url::form_urlencoded::byte_serialize(label.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        format!("otpauth://totp/{}?{}", label, query.finish())
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Code valid at `at`.
    pub fn code_at(&self, at: DateTime<Utc>) -> OtpCode {
        let counter = at.timestamp().max(0) as u64 / self.period;
        self.code_for(counter)
    }

    /// Code valid right now.
    pub fn current(&self) -> OtpCode {
        self.code_at(Utc::now())
    }

    /// Endless sequence of consecutive codes starting with the window holding `from`.
    ///
    /// Each call starts over; iterating never touches the descriptor.
    pub fn codes(&self, from: DateTime<Utc>) -> Codes<'_> {
        Codes {
            config: self,
            counter: from.timestamp().max(0) as u64 / self.period,
        }
    }

    fn code_for(&self, counter: u64) -> OtpCode {
        let digest = self.mac(&counter.to_be_bytes());
        let value = truncate(&digest) as u64 % 10u64.pow(self.digits);
        let code = format!("{:0width$}", value, width = self.digits as usize);

        let start = counter.saturating_mul(self.period);
        OtpCode {
            code,
            valid_from: timestamp(start),
            valid_until: timestamp(start.saturating_add(self.period)),
        }
    }

    fn mac(&self, message: &[u8]) -> Vec<u8> {
        match self.algorithm {
            Algorithm::Sha1 => hmac_digest!(sha1::Sha1, &self.seed, message),
            Algorithm::Sha256 => hmac_digest!(sha2::Sha256, &self.seed, message),
            Algorithm::Sha512 => hmac_digest!(sha2::Sha512, &self.seed, message),
        }
    }
}

impl std::fmt::Debug for OtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpConfig")
            .field("period", &self.period)
            .field("digits", &self.digits)
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

/// Iterator returned by [`OtpConfig::codes`].
pub struct Codes<'a> {
    config: &'a OtpConfig,
    counter: u64,
}

impl Iterator for Codes<'_> {
    type Item = OtpCode;

    fn next(&mut self) -> Option<OtpCode> {
        let code = self.config.code_for(self.counter);
        self.counter = self.counter.saturating_add(1);
        Some(code)
    }
}

/// RFC 4226 dynamic truncation.
fn truncate(digest: &[u8]) -> u32 {
    let Some(last) = digest.last() else {
        return 0;
    };
    let offset = (last & 0x0f) as usize;
    match digest.get(offset..offset + 4) {
        Some(&[a, b, c, d]) => u32::from_be_bytes([a & 0x7f, b, c, d]),
        _ => 0,
    }
}

fn timestamp(secs: u64) -> DateTime<Utc> {
    let secs = i64::try_from(secs).unwrap_or(i64::MAX);
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn decode_seed(seed: &str) -> Option<Zeroizing<Vec<u8>>> {
    let normalized: Zeroizing<String> = Zeroizing::new(
        seed.chars()
            .filter(|c| !c.is_whitespace() && *c != '=' && *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect(),
    );
    if normalized.is_empty() {
        return None;
    }
    BASE32_NOPAD
        .decode(normalized.as_bytes())
        .ok()
        .filter(|bytes| !bytes.is_empty())
        .map(Zeroizing::new)
}

fn decode_label(raw: &str) -> String {
    // Labels are percent-encoded path segments; '+' stays literal there.
    let escaped = raw.replace('+', "%2B");
    url::form_urlencoded::parse(format!("l={}", escaped).as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}
