use std::{collections::HashMap, sync::Arc};

use rwa_primitives::wallet::InjectedWallet;

/// Slots a wallet extension may inject itself under, in lookup order.
pub const WALLET_SLOTS: [&str; 4] = ["suiWallet", "sui", "onechainWallet", "onechain"];

/// Name fragments used to pick among registered wallets, in order.
const REGISTERED_NAME_HINTS: [&str; 2] = ["sui", "onechain"];

/// Wallets visible to the client: the ones injected under well known slots
/// and the ones announced through the wallet registry.
#[derive(Default, Clone)]
pub struct InjectedWallets {
    slots: HashMap<String, Arc<dyn InjectedWallet>>,
    registered: Vec<Arc<dyn InjectedWallet>>,
}

impl InjectedWallets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, slot: impl Into<String>, wallet: Arc<dyn InjectedWallet>) -> Self {
        self.slots.insert(slot.into(), wallet);
        self
    }

    pub fn with_registered(mut self, wallet: Arc<dyn InjectedWallet>) -> Self {
        self.registered.push(wallet);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.registered.is_empty()
    }

    /// First candidate wallet, or `None` when nothing usable is present.
    pub fn discover(&self) -> Option<Arc<dyn InjectedWallet>> {
        WALLET_SLOTS
            .iter()
            .find_map(|slot| self.slots.get(*slot).cloned())
            .or_else(|| {
                REGISTERED_NAME_HINTS.iter().find_map(|hint| {
                    self.registered
                        .iter()
                        .find(|wallet| wallet.name().to_ascii_lowercase().contains(hint))
                        .cloned()
                })
            })
    }

    /// The wallet named exactly `name`, if it is present.
    pub fn discover_named(&self, name: &str) -> Option<Arc<dyn InjectedWallet>> {
        self.slots
            .values()
            .chain(self.registered.iter())
            .find(|wallet| wallet.name() == name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rwa_tests_utils::wallet::MockWallet;

    fn wallet(name: &str) -> Arc<dyn InjectedWallet> {
        MockWallet::new(name).into_arc()
    }

    #[test]
    fn test_slots_win_in_order() {
        let wallets = InjectedWallets::new()
            .with_registered(wallet("Sui Wallet"))
            .with_slot("onechain", wallet("from-onechain"))
            .with_slot("sui", wallet("from-sui"));

        assert_eq!(wallets.discover().unwrap().name(), "from-sui");
    }

    #[rstest]
    #[case(vec!["Phantom", "OneChain Wallet", "Suiet"], Some("Suiet"))]
    #[case(vec!["Phantom", "OneChain Wallet"], Some("OneChain Wallet"))]
    #[case(vec!["Phantom", "MetaMask"], None)]
    fn test_registered_wallets_by_name(#[case] names: Vec<&str>, #[case] expected: Option<&str>) {
        let wallets = names
            .into_iter()
            .fold(InjectedWallets::new(), |acc, name| acc.with_registered(wallet(name)));

        assert_eq!(wallets.discover().map(|w| w.name()), expected.map(str::to_string));
    }

    #[test]
    fn test_unknown_slot_is_ignored() {
        let wallets = InjectedWallets::new().with_slot("ethereum", wallet("MetaMask"));
        assert!(wallets.discover().is_none());
        assert!(!wallets.is_empty());
    }

    #[test]
    fn test_discover_named_matches_name_only() {
        let wallets = InjectedWallets::new()
            .with_slot("suiWallet", wallet("first"))
            .with_registered(wallet("onechain-extension"));

        assert_eq!(wallets.discover_named("onechain-extension").unwrap().name(), "onechain-extension");
        assert!(wallets.discover_named("gone").is_none());
    }
}
