use leohunt::HuntError;
use leohunt::models::DMS_EXAMPLE;

use super::{Session, fail};
use crate::display::display_receipt;

pub fn submit_guess(session: &Session, user_id: u64, dms: &str) {
    let hunt = session.open_hunt();

    match hunt.submit(user_id, dms) {
        Ok(receipt) => {
            let week_id = hunt.current_week_id().unwrap_or_else(|e| fail(&e));
            display_receipt(&week_id, &receipt);
        }
        Err(HuntError::NoTarget) => {
            eprintln!("The weekly target is not set yet. Please wait for the challenge to start.");
            std::process::exit(1);
        }
        Err(HuntError::Format(_)) => {
            eprintln!("Invalid format. Please copy coordinates directly from Google Earth.");
            eprintln!("Example: {}", DMS_EXAMPLE);
            std::process::exit(1);
        }
        Err(e) => fail(&e),
    }
}
