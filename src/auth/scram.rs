//! SCRAM credential derivation (RFC 5802, RFC 7677)
//!
//! Produces the `iterationCount`/`salt`/`storedKey`/`serverKey` set the server
//! keeps for a user. The password itself is never stored:
//!
//! ```text
//! SaltedPassword = Hi(SASLprep(password), salt, i)
//! StoredKey      = H(HMAC(SaltedPassword, "Client Key"))
//! ServerKey      = HMAC(SaltedPassword, "Server Key")
//! ```
//!
//! The SCRAM-SHA-1 set is computed over the legacy MONGODB-CR digest of the
//! password rather than the password itself.
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::core::ScramShaCreds;
use crate::error::{AutomationError, AutomationResult};
use crate::utils::random::random_bytes;

pub const SCRAM_SHA1_ITERATIONS: u32 = 10_000;
pub const SCRAM_SHA256_ITERATIONS: u32 = 15_000;

/// Bytes reserved for the `INT(1)` block suffix appended to the salt
pub const RFC5802_MANDATED_SALT_SIZE: usize = 4;

const CLIENT_KEY: &[u8] = b"Client Key";
const SERVER_KEY: &[u8] = b"Server Key";

/// Credential family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScramMechanism {
    /// SCRAM-SHA-1 over the MONGODB-CR password digest
    Sha1,
    Sha256,
}

impl ScramMechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScramMechanism::Sha1 => "SCRAM-SHA-1",
            ScramMechanism::Sha256 => "SCRAM-SHA-256",
        }
    }

    pub fn iterations(&self) -> u32 {
        match self {
            ScramMechanism::Sha1 => SCRAM_SHA1_ITERATIONS,
            ScramMechanism::Sha256 => SCRAM_SHA256_ITERATIONS,
        }
    }

    /// Hash output size in bytes
    pub fn hash_size(&self) -> usize {
        match self {
            ScramMechanism::Sha1 => <Sha1 as Digest>::output_size(),
            ScramMechanism::Sha256 => <Sha256 as Digest>::output_size(),
        }
    }

    pub fn salt_size(&self) -> usize {
        self.hash_size() - RFC5802_MANDATED_SALT_SIZE
    }
}

impl fmt::Display for ScramMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScramMechanism {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MONGODB-CR" | "SCRAM-SHA-1" => Ok(ScramMechanism::Sha1),
            "SCRAM-SHA-256" => Ok(ScramMechanism::Sha256),
            other => Err(AutomationError::unsupported_mechanism(other)),
        }
    }
}

/// Derive a credential set with a fresh random salt
pub fn derive_credentials(
    mechanism: &str,
    username: &str,
    password: &str,
) -> AutomationResult<ScramShaCreds> {
    let mechanism: ScramMechanism = mechanism.parse()?;
    let salt = random_bytes(mechanism.salt_size(), "salt")?;
    derive(mechanism, username, password, &salt)
}

/// Derive a credential set from a known base64 salt. Deterministic.
pub fn derive_credentials_with_salt(
    mechanism: ScramMechanism,
    username: &str,
    password: &str,
    salt: &str,
) -> AutomationResult<ScramShaCreds> {
    let salt = STANDARD.decode(salt)?;
    derive(mechanism, username, password, &salt)
}

/// Hex MD5 of `<username>:mongo:<password>`
pub fn mongodb_cr_password(username: &str, password: &str) -> String {
    hex::encode(md5::compute(format!("{}:mongo:{}", username, password)).0)
}

fn derive(
    mechanism: ScramMechanism,
    username: &str,
    password: &str,
    salt: &[u8],
) -> AutomationResult<ScramShaCreds> {
    if salt.len() != mechanism.salt_size() {
        return Err(AutomationError::SaltSizeMismatch {
            expected: mechanism.salt_size(),
            actual: salt.len(),
        });
    }

    let iterations = mechanism.iterations();
    let (stored_key, server_key) = match mechanism {
        ScramMechanism::Sha1 => {
            let password = mongodb_cr_password(username, password);
            compute_keys::<Hmac<Sha1>, Sha1>(&password, salt, iterations)?
        }
        ScramMechanism::Sha256 => compute_keys::<Hmac<Sha256>, Sha256>(password, salt, iterations)?,
    };

    Ok(ScramShaCreds {
        iteration_count: iterations,
        salt: STANDARD.encode(salt),
        stored_key: STANDARD.encode(stored_key),
        server_key: STANDARD.encode(server_key),
    })
}

/// (StoredKey, ServerKey)
fn compute_keys<M, D>(
    password: &str,
    salt: &[u8],
    iterations: u32,
) -> AutomationResult<(Vec<u8>, Vec<u8>)>
where
    M: Mac + KeyInit + Clone,
    D: Digest,
{
    let salted = salted_password::<M>(password, salt, iterations)?;
    let client_key = hmac_sum::<M>(&salted, &[CLIENT_KEY])?;
    let server_key = hmac_sum::<M>(&salted, &[SERVER_KEY])?;
    let stored_key = D::digest(&client_key).to_vec();
    Ok((stored_key, server_key))
}

/// `Hi()` from RFC 5802: PBKDF2 with the HMAC as PRF and a single output block
fn salted_password<M>(password: &str, salt: &[u8], iterations: u32) -> AutomationResult<Vec<u8>>
where
    M: Mac + KeyInit + Clone,
{
    let prepared = stringprep::saslprep(password).map_err(|e| {
        AutomationError::PasswordPreparation {
            message: e.to_string(),
        }
    })?;
    let keyed = keyed_mac::<M>(prepared.as_bytes())?;

    let mut mac = keyed.clone();
    mac.update(salt);
    mac.update(&1u32.to_be_bytes());
    let mut u = mac.finalize().into_bytes().to_vec();
    let mut hi = u.clone();

    for _ in 1..iterations {
        let mut mac = keyed.clone();
        mac.update(&u);
        u = mac.finalize().into_bytes().to_vec();
        hi.iter_mut().zip(&u).for_each(|(h, b)| *h ^= b);
    }

    Ok(hi)
}

fn hmac_sum<M>(key: &[u8], parts: &[&[u8]]) -> AutomationResult<Vec<u8>>
where
    M: Mac + KeyInit + Clone,
{
    let mut mac = keyed_mac::<M>(key)?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}

fn keyed_mac<M: Mac + KeyInit>(key: &[u8]) -> AutomationResult<M> {
    <M as KeyInit>::new_from_slice(key).map_err(|e| AutomationError::MacKey {
        message: e.to_string(),
    })
}
