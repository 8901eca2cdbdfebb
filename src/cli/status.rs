use leohunt::MAX_ATTEMPTS;

use super::{Session, fail};
use crate::display::display_panel;

pub fn show_status(session: &Session, user: Option<u64>) {
    let hunt = session.open_hunt();

    let week_id = hunt.current_week_id().unwrap_or_else(|e| fail(&e));
    let target = hunt.current_target().unwrap_or_else(|e| fail(&e));

    println!("Week: {}", week_id);
    match (target, session.admin) {
        (Some(t), true) => println!("Target: {}", t),
        (Some(_), false) => println!("Target: set, submissions are open"),
        (None, _) => println!("Target: not set yet"),
    }

    if let Some(user_id) = user {
        let used = hunt.attempts_used(user_id).unwrap_or_else(|e| fail(&e));
        println!("Attempts used: {}/{}", used, MAX_ATTEMPTS);
    }
}

pub fn show_panel() {
    display_panel();
}
