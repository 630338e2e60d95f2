pub mod balance;
pub mod emoney;
pub mod merchant;
pub mod qris;
pub mod retail;
pub mod topup;
pub mod transfer;
pub mod virtual_account;

pub use balance::BalanceService;
pub use emoney::EmoneyService;
pub use merchant::MerchantService;
pub use qris::QrisService;
pub use retail::RetailService;
pub use topup::TopupService;
pub use transfer::TransferService;
pub use virtual_account::VirtualAccountService;

use crate::config::PakaiLinkConfig;
use crate::modules::gateway::ApiClient;
use std::sync::Arc;

/// Every product service over one shared [`ApiClient`]
pub struct PaymentServices {
    pub virtual_account: VirtualAccountService,
    pub qris: QrisService,
    pub emoney: EmoneyService,
    pub retail: RetailService,
    pub transfer: TransferService,
    pub topup: TopupService,
    pub balance: BalanceService,
    pub merchant: MerchantService,
}

impl PaymentServices {
    pub fn new(client: Arc<ApiClient>, config: &PakaiLinkConfig) -> Self {
        Self {
            virtual_account: VirtualAccountService::new(client.clone(), config),
            qris: QrisService::new(client.clone(), config),
            emoney: EmoneyService::new(client.clone(), config),
            retail: RetailService::new(client.clone(), config),
            transfer: TransferService::new(client.clone(), config),
            topup: TopupService::new(client.clone(), config),
            balance: BalanceService::new(client.clone(), config),
            merchant: MerchantService::new(client, config),
        }
    }
}
