pub mod bank_code;
pub mod requests;

pub use requests::{
    generate_reference_no, random_reference, CreateEmoneyPayment, CreateRetailPayment,
    CreateVirtualAccount, GenerateQris, TopupPayment, TransferToBank,
};
pub use bank_code::BankCode;
