use shared_types::{Address, PublicKey};

/// Account lookup filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountFilter {
    Address(Address),
    /// Matches only accounts whose public key is already set.
    PublicKey(PublicKey),
    /// Confirmed username.
    Username(String),
    /// Pending username.
    UnconfirmedUsername(String),
    /// Any of the given public keys.
    PublicKeys(Vec<PublicKey>),
    /// Every registered delegate.
    Delegates,
    All,
}

impl AccountFilter {
    /// Check an account against the filter.
    pub fn matches(&self, account: &shared_types::Account) -> bool {
        match self {
            AccountFilter::Address(address) => account.address == *address,
            AccountFilter::PublicKey(key) => account.public_key.as_ref() == Some(key),
            AccountFilter::Username(name) => account.username.as_deref() == Some(name.as_str()),
            AccountFilter::UnconfirmedUsername(name) => {
                account.u_username.as_deref() == Some(name.as_str())
            }
            AccountFilter::PublicKeys(keys) => account
                .public_key
                .as_ref()
                .is_some_and(|key| keys.contains(key)),
            AccountFilter::Delegates => account.is_delegate,
            AccountFilter::All => true,
        }
    }
}
