//! Caller identity as handed to this core by whatever authenticated the
//! connection. GSS/Kerberos negotiation itself lives outside this crate;
//! all the dispatcher needs is the principal string and flavor that came
//! out of it, to enforce that a session is only ever driven by the
//! principal that created its client record.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecFlavor {
    Sys,
    Krb5,
    Krb5i,
    Krb5p,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub principal: String,
    pub flavor: SecFlavor,
}

impl Identity {
    pub fn new(principal: impl Into<String>, flavor: SecFlavor) -> Self {
        Self {
            principal: principal.into(),
            flavor,
        }
    }

    pub fn matches(&self, other: &Identity) -> bool {
        self.principal == other.principal && self.flavor == other.flavor
    }
}

/// EXCHANGE_ID's `eia_state_protect` negotiation. Only `None` is
/// implemented: a client asking for `MachCred` or `Ssv` gets NOTSUPP,
/// since both require the SSV/GSS machinery this core does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateProtection {
    None,
    MachCred,
    Ssv,
}

impl StateProtection {
    pub fn is_supported(self) -> bool {
        matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_principal_and_flavor_match() {
        let a = Identity::new("alice@realm", SecFlavor::Krb5);
        let b = Identity::new("alice@realm", SecFlavor::Krb5);
        assert!(a.matches(&b));
    }

    #[test]
    fn differing_flavor_does_not_match() {
        let a = Identity::new("alice@realm", SecFlavor::Krb5);
        let b = Identity::new("alice@realm", SecFlavor::Krb5i);
        assert!(!a.matches(&b));
    }

    #[test]
    fn only_sp4_none_is_supported() {
        assert!(StateProtection::None.is_supported());
        assert!(!StateProtection::MachCred.is_supported());
        assert!(!StateProtection::Ssv.is_supported());
    }
}
