use super::{Session, fail};

pub fn start_week(session: &Session, week_id: &str) {
    session.require_admin();
    let hunt = session.open_hunt();

    if let Err(e) = hunt.start_week(week_id) {
        fail(&e);
    }

    println!(
        "New week started: {}. Target cleared (set it with `leohunt set-target`).",
        week_id.trim()
    );
}

pub fn set_target(session: &Session, dms: &str) {
    session.require_admin();
    let hunt = session.open_hunt();

    match hunt.set_target(dms) {
        Ok(target) => {
            let week_id = hunt.current_week_id().unwrap_or_else(|e| fail(&e));
            println!("Target set for {}: {}", week_id, target);
        }
        Err(e) => fail(&e),
    }
}
