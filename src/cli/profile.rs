use super::ui;
use crate::core::error::ServiceResult;
use crate::core::user::{
    ProfileUpdate, TokenBalance, UserActivity, UserDataManager, UserInvestment, UserNft,
    UserNotification, UserProfile, UserReputationScore,
};
use anyhow::Result;
use comfy_table::Cell;
use tracing::{debug, warn};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Default)]
pub struct ProfileOptions {
    pub activity_limit: usize,
    pub unread_only: bool,
    /// Mark the listed unread notifications as read after showing them.
    pub mark_read: bool,
    pub update: ProfileUpdate,
}

fn print_section<T>(title: &str, result: &ServiceResult<T>, render: impl Fn(&T) -> String) {
    println!("{}\n", ui::style_text(title, ui::StyleType::Title));
    match result {
        Ok(value) => println!("{}", render(value)),
        Err(e) => println!("{}", ui::style_text(&format!("Error: {e}"), ui::StyleType::Error)),
    }
}

fn empty_or(table: String, is_empty: bool, what: &str) -> String {
    if is_empty {
        ui::style_text(&format!("No {what}."), ui::StyleType::Subtle)
    } else {
        table
    }
}

pub fn profile_table(profile: &UserProfile) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Field"), ui::header_cell("Value")]);
    let optional = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    table.add_row(vec![Cell::new("Wallet"), Cell::new(&profile.public_key)]);
    table.add_row(vec![
        Cell::new("Name"),
        Cell::new(optional(&profile.display_name)),
    ]);
    table.add_row(vec![Cell::new("Bio"), Cell::new(optional(&profile.bio))]);
    table.add_row(vec![
        Cell::new("Twitter"),
        Cell::new(optional(&profile.twitter)),
    ]);
    table.add_row(vec![
        Cell::new("Discord"),
        Cell::new(optional(&profile.discord)),
    ]);
    table.add_row(vec![
        Cell::new("Joined"),
        Cell::new(profile.joined_at.format("%Y-%m-%d").to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Last active"),
        Cell::new(profile.last_active.format(DATE_FORMAT).to_string()),
    ]);
    table.to_string()
}

pub fn reputation_table(score: &UserReputationScore) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Overall"),
        ui::header_cell("Investment"),
        ui::header_cell("Governance"),
        ui::header_cell("Community"),
    ]);
    table.add_row(vec![
        ui::number_cell(score.overall.to_string()),
        ui::number_cell(score.investment.to_string()),
        ui::number_cell(score.governance.to_string()),
        ui::number_cell(score.community.to_string()),
    ]);
    table.to_string()
}

pub fn activities_table(activities: &[UserActivity]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("When"),
        ui::header_cell("Type"),
        ui::header_cell("Details"),
    ]);
    for activity in activities {
        table.add_row(vec![
            Cell::new(activity.timestamp.format(DATE_FORMAT).to_string()),
            Cell::new(activity.kind.label()),
            Cell::new(activity.kind.to_string()),
        ]);
    }
    empty_or(table.to_string(), activities.is_empty(), "activity")
}

pub fn investments_table(investments: &[UserInvestment], currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell("Type"),
        ui::header_cell(&format!("Amount ({currency})")),
        ui::header_cell("Status"),
        ui::header_cell("Date"),
    ]);
    for investment in investments {
        table.add_row(vec![
            Cell::new(&investment.asset_id),
            Cell::new(format!("{:?}", investment.investment_type)),
            ui::number_cell(format!("{:.2}", investment.amount)),
            Cell::new(format!("{:?}", investment.status)),
            Cell::new(investment.timestamp.format("%Y-%m-%d").to_string()),
        ]);
    }
    empty_or(table.to_string(), investments.is_empty(), "investments")
}

pub fn notifications_table(notifications: &[UserNotification]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Type"),
        ui::header_cell("Title"),
        ui::header_cell("Message"),
        ui::header_cell("When"),
    ]);
    for notification in notifications {
        let marker = if notification.is_read { "" } else { "●" };
        table.add_row(vec![
            Cell::new(marker).fg(comfy_table::Color::Yellow),
            Cell::new(format!("{:?}", notification.kind)),
            Cell::new(&notification.title),
            Cell::new(&notification.message),
            Cell::new(notification.timestamp.format(DATE_FORMAT).to_string()),
        ]);
    }
    empty_or(table.to_string(), notifications.is_empty(), "notifications")
}

pub fn balances_table(balances: &[TokenBalance]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Mint"), ui::header_cell("Amount")]);
    for balance in balances.iter().filter(|b| !b.is_nft()) {
        table.add_row(vec![
            Cell::new(&balance.mint),
            ui::number_cell(format!(
                "{:.prec$}",
                balance.ui_amount(),
                prec = balance.decimals as usize
            )),
        ]);
    }
    let fungible = balances.iter().filter(|b| !b.is_nft()).count();
    empty_or(table.to_string(), fungible == 0, "token balances")
}

pub fn nfts_table(nfts: &[UserNft]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Mint"),
        ui::header_cell("Name"),
        ui::header_cell("Collection"),
    ]);
    for nft in nfts {
        table.add_row(vec![
            Cell::new(&nft.mint),
            Cell::new(&nft.name),
            Cell::new(nft.collection.as_deref().unwrap_or("-")),
        ]);
    }
    empty_or(table.to_string(), nfts.is_empty(), "NFTs")
}

/// Fetches and prints everything known about the connected wallet.
///
/// Sections fail independently; only a missing wallet or a failed profile
/// update aborts the command.
pub async fn run(manager: &UserDataManager, options: ProfileOptions, currency: &str) -> Result<()> {
    let user_id = manager.current_user_id()?.to_string();
    let ProfileOptions {
        activity_limit,
        unread_only,
        mark_read,
        update,
    } = options;

    if !update.is_empty() {
        let updated = manager.update_user_profile(update).await?;
        debug!("Updated profile for {}", updated.public_key);
        println!(
            "{}",
            ui::style_text("Profile updated.", ui::StyleType::TotalLabel)
        );
    }

    let pb = ui::new_progress_bar(7, true);
    pb.set_message(format!("Fetching data for {user_id}..."));
    let (profile, reputation, activities, investments, notifications, balances) =
        futures::join!(
            async {
                let r = manager.user_profile().await;
                pb.inc(1);
                r
            },
            async {
                let r = manager.reputation_score().await;
                pb.inc(1);
                r
            },
            async {
                let r = manager.user_activities(activity_limit).await;
                pb.inc(1);
                r
            },
            async {
                let r = manager.user_investments().await;
                pb.inc(1);
                r
            },
            async {
                let r = manager.user_notifications(unread_only).await;
                pb.inc(1);
                r
            },
            async {
                let r = manager.token_balances().await;
                pb.inc(1);
                r
            },
        );
    // NFTs come from the same token accounts, now in the balance cache.
    let nfts = match &balances {
        Ok(_) => manager.user_nfts().await,
        Err(e) => Err(e.clone()),
    };
    pb.inc(1);
    pb.finish_and_clear();

    print_section("Profile", &profile, profile_table);
    ui::print_separator();
    print_section("Reputation", &reputation, reputation_table);
    ui::print_separator();
    print_section("Recent Activity", &activities, |a| activities_table(a));
    ui::print_separator();
    print_section("Investments", &investments, |i| {
        investments_table(i, currency)
    });
    ui::print_separator();
    print_section("Notifications", &notifications, |n| notifications_table(n));
    ui::print_separator();
    print_section("Token Balances", &balances, |b| balances_table(b));
    ui::print_separator();
    print_section("NFTs", &nfts, |n| nfts_table(n));

    if mark_read {
        if let Ok(notifications) = &notifications {
            let unread: Vec<String> = notifications
                .iter()
                .filter(|n| !n.is_read)
                .map(|n| n.id.clone())
                .collect();
            if unread.is_empty() {
                debug!("No unread notifications to mark");
            } else if let Err(e) = manager.mark_notifications_read(&unread).await {
                warn!("Failed to mark notifications as read: {e}");
                println!(
                    "{}",
                    ui::style_text(&format!("Error: {e}"), ui::StyleType::Error)
                );
            } else {
                println!("\nMarked {} notification(s) as read.", unread.len());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::user::{ActivityKind, NotificationKind, TransferDirection};
    use chrono::{TimeZone, Utc};

    const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    #[test]
    fn test_profile_table_shows_missing_fields_as_dash() {
        let profile = UserProfile {
            public_key: WALLET.to_string(),
            display_name: Some("SolMosaic User".to_string()),
            avatar: None,
            bio: None,
            twitter: Some("@solmosaic_user".to_string()),
            discord: None,
            joined_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            last_active: Utc.with_ymd_and_hms(2025, 4, 2, 9, 30, 0).unwrap(),
        };
        let output = profile_table(&profile);
        assert!(output.contains(WALLET));
        assert!(output.contains("@solmosaic_user"));
        assert!(output.contains("2025-03-01"));
        assert!(output.contains("2025-04-02 09:30"));
        assert!(output.contains(" - "));
    }

    #[test]
    fn test_activities_table() {
        let activities = vec![UserActivity {
            id: "a1".to_string(),
            user_id: WALLET.to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 4, 2, 9, 30, 0).unwrap(),
            kind: ActivityKind::TokenTransaction {
                mint: "MOSAIC".to_string(),
                amount: 250.0,
                direction: TransferDirection::Incoming,
            },
        }];
        let output = activities_table(&activities);
        assert!(output.contains("Token Transaction"));
        assert!(output.contains("Received 250 of MOSAIC"));
        assert!(activities_table(&[]).contains("No activity."));
    }

    #[test]
    fn test_notifications_table_marks_unread() {
        let notifications = vec![UserNotification {
            id: "n1".to_string(),
            user_id: WALLET.to_string(),
            kind: NotificationKind::Governance,
            title: "Proposal Passed".to_string(),
            message: "Your proposal has passed".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 4, 2, 9, 30, 0).unwrap(),
            is_read: false,
            action_url: None,
        }];
        let output = notifications_table(&notifications);
        assert!(output.contains("●"));
        assert!(output.contains("Governance"));
        assert!(output.contains("Proposal Passed"));
    }

    #[test]
    fn test_balances_table_skips_nfts() {
        let balances = vec![
            TokenBalance {
                mint: "So11111111111111111111111111111111111111112".to_string(),
                amount: 1_500_000_000,
                decimals: 9,
            },
            TokenBalance {
                mint: "NftMint".to_string(),
                amount: 1,
                decimals: 0,
            },
        ];
        let output = balances_table(&balances);
        assert!(output.contains("1.500000000"));
        assert!(!output.contains("NftMint"));
        assert!(balances_table(&balances[1..]).contains("No token balances."));
    }
}
