use leohunt::MAX_ATTEMPTS;
use leohunt::models::{DMS_EXAMPLE, LeaderboardEntry, SubmitReceipt};

pub fn render_leaderboard(week_id: &str, entries: &[LeaderboardEntry]) -> String {
    let mut lines = vec![format!(
        "LEOHUNT Leaderboard - {} (Top {})",
        week_id,
        entries.len()
    )];

    for (i, entry) in entries.iter().enumerate() {
        let when = entry
            .submitted_at_utc()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| entry.best_timestamp.to_string());
        lines.push(format!(
            "#{} <{}> - {:.2} m - {}",
            i + 1,
            entry.user_id,
            entry.best_distance_m,
            when
        ));
    }

    lines.join("\n")
}

// The distance is never part of a receipt.
pub fn display_receipt(week_id: &str, receipt: &SubmitReceipt) {
    println!("Submission received for {}.", week_id);
    println!(
        "Attempts used: {}/{}.",
        receipt.attempts_used, receipt.attempts_max
    );
    println!("Good luck!");
}

pub fn display_panel() {
    println!("\n{}", "=".repeat(60));
    println!("  LEOHUNT - Coordinate Submissions");
    println!("{}\n", "=".repeat(60));

    println!("Format (Google Earth): DMS");
    println!("Example: {}\n", DMS_EXAMPLE);

    println!("{}", "-".repeat(60));
    println!("Rules:");
    println!("  - Maximum {} submissions per week", MAX_ATTEMPTS);
    println!("  - No editing or deleting submissions");
    println!("  - Only coordinates, no text");
    println!("{}", "-".repeat(60));

    println!("\nWinner: closest coordinate wins");
    println!("If equally close, the earliest timestamp wins");

    println!("\n{}", "=".repeat(60));
    println!("Run `leohunt submit --user <id> <lat> <lon>` to play");
    println!("{}\n", "=".repeat(60));
}
