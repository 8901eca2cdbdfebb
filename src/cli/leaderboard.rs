use leohunt::HuntError;
use leohunt::models::clamp_top_n;

use super::{Session, fail};
use crate::display::render_leaderboard;

pub fn show_leaderboard(session: &Session, top: Option<i64>) {
    session.require_admin();
    let hunt = session.open_hunt();

    let default = session.config.leaderboard_size;
    let top_n = match top {
        Some(n) => clamp_top_n(n, default),
        None => default,
    };

    match hunt.leaderboard(top_n) {
        Ok((_, entries)) if entries.is_empty() => println!("No submissions yet."),
        Ok((week_id, entries)) => println!("{}", render_leaderboard(&week_id, &entries)),
        Err(HuntError::NoTarget) => {
            eprintln!("Target not set yet. Use `leohunt set-target` first.");
            std::process::exit(1);
        }
        Err(e) => fail(&e),
    }
}
