//! Transaction list row render model.

use rust_decimal::{Decimal, RoundingStrategy};

use super::Haptics;
use crate::config::AMOUNT_SCALE;
use crate::domain::{Transaction, TransactionStatus};

const UNKNOWN_RECIPIENT: &str = "Unknown recipient";
const SENT_DETAIL: &str = "↘ 0.00%";
const FALLBACK_STATUS_COLOR: &str = "#6b7280";

/// Color tokens supplied by the host theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub border: String,
    pub primary: String,
    pub text: String,
    pub text_muted: String,
    pub is_dark: bool,
}

/// Badge color for a raw status value.
pub fn status_color(status: &str) -> &'static str {
    match status {
        "pending" => "#3b82f6",
        "processing" => "#f59e0b",
        "sent" => "#10b981",
        "cancelled" | "failed" => "#ef4444",
        _ => FALLBACK_STATUS_COLOR,
    }
}

/// Secondary text under the amount.
pub fn detail_text(status: &TransactionStatus) -> String {
    match status {
        TransactionStatus::Sent => SENT_DETAIL.to_string(),
        other => other.as_str().to_uppercase(),
    }
}

/// Two decimals with thousands separators: `1234567.5` -> `1,234,567.50`.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// What the host draws for one transaction row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub recipient: String,
    pub amount: String,
    /// `<reference> • <Mon D, YYYY>`
    pub reference_line: String,
    pub status_label: String,
    pub status_color: &'static str,
    pub badge_background: String,
    pub detail_text: String,
    pub border_color: String,
    pub text_color: String,
    pub muted_color: String,
    pub amount_color: String,
}

/// One row in the transaction list.
pub struct TransactionCard {
    pub tx: Transaction,
    pub theme: Theme,
    pub on_press: Option<Box<dyn Fn(&Transaction) + Send + Sync>>,
}

impl TransactionCard {
    pub fn new(tx: Transaction, theme: Theme) -> Self {
        Self {
            tx,
            theme,
            on_press: None,
        }
    }

    pub fn on_press(mut self, f: impl Fn(&Transaction) + Send + Sync + 'static) -> Self {
        self.on_press = Some(Box::new(f));
        self
    }

    pub fn render(&self) -> CardView {
        let color = status_color(self.tx.status.as_str());
        let badge_alpha = if self.theme.is_dark { "33" } else { "1a" };

        CardView {
            recipient: self
                .tx
                .recipient_name()
                .unwrap_or(UNKNOWN_RECIPIENT)
                .to_string(),
            amount: format_amount(self.tx.amount_sent),
            reference_line: format!(
                "{} • {}",
                self.tx.reference(),
                self.tx.created_at.format("%b %-d, %Y")
            ),
            status_label: self.tx.status.as_str().to_uppercase(),
            status_color: color,
            badge_background: format!("{}{}", color, badge_alpha),
            detail_text: detail_text(&self.tx.status),
            border_color: self.theme.border.clone(),
            text_color: self.theme.text.clone(),
            muted_color: self.theme.text_muted.clone(),
            amount_color: self.theme.primary.clone(),
        }
    }

    /// Handle a tap: selection tick, then the callback with the transaction.
    pub fn press(&self, haptics: &dyn Haptics) {
        haptics.selection();
        if let Some(on_press) = &self.on_press {
            on_press(&self.tx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::fixtures::transaction;
    use crate::ui::MockHaptics;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    fn theme(is_dark: bool) -> Theme {
        Theme {
            border: "#e5e7eb".into(),
            primary: "#2563eb".into(),
            text: "#111827".into(),
            text_muted: "#6b7280".into(),
            is_dark,
        }
    }

    fn sample() -> Transaction {
        let created = Utc.with_ymd_and_hms(2026, 2, 24, 14, 5, 0).unwrap();
        transaction(42, 1, created)
    }

    #[test]
    fn sent_detail_is_flat_rate_delta() {
        assert_eq!(detail_text(&TransactionStatus::Sent), "↘ 0.00%");
        assert_eq!(detail_text(&TransactionStatus::Processing), "PROCESSING");
        assert_eq!(detail_text(&TransactionStatus::from("on_hold")), "ON_HOLD");
    }

    #[test]
    fn status_colors() {
        assert_eq!(status_color("pending"), "#3b82f6");
        assert_eq!(status_color("processing"), "#f59e0b");
        assert_eq!(status_color("sent"), "#10b981");
        assert_eq!(status_color("cancelled"), "#ef4444");
        assert_eq!(status_color("failed"), "#ef4444");
        assert_eq!(status_color("refunded"), "#6b7280");
    }

    #[test]
    fn amounts_get_separators_and_cents() {
        assert_eq!(format_amount(Decimal::from(100)), "100.00");
        assert_eq!(format_amount(Decimal::from_str("1234567.5").unwrap()), "1,234,567.50");
        assert_eq!(format_amount(Decimal::from_str("999.999").unwrap()), "1,000.00");
        assert_eq!(format_amount(Decimal::from_str("-1500").unwrap()), "-1,500.00");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn renders_row_from_transaction() {
        let mut tx = sample();
        tx.transaction_id = Some("QT-20260224-7K2Q".into());
        tx.status = TransactionStatus::Processing;

        let view = TransactionCard::new(tx, theme(false)).render();

        assert_eq!(view.recipient, "Chidi Okafor");
        assert_eq!(view.amount, "100.00");
        assert_eq!(view.reference_line, "QT-20260224-7K2Q • Feb 24, 2026");
        assert_eq!(view.status_label, "PROCESSING");
        assert_eq!(view.status_color, "#f59e0b");
        assert_eq!(view.badge_background, "#f59e0b1a");
        assert_eq!(view.detail_text, "PROCESSING");
    }

    #[test]
    fn missing_recipient_and_id_fall_back() {
        let mut tx = sample();
        tx.recipient_details = serde_json::json!({ "bank": "GTBank" });

        let view = TransactionCard::new(tx, theme(true)).render();

        assert_eq!(view.recipient, "Unknown recipient");
        assert_eq!(view.reference_line, "#42 • Feb 24, 2026");
        assert_eq!(view.badge_background, "#3b82f633");
    }

    #[test]
    fn press_sends_selection_and_transaction() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();

        let mut haptics = MockHaptics::new();
        haptics.expect_selection().times(1).return_const(());
        haptics.expect_impact_light().never();

        TransactionCard::new(sample(), theme(false))
            .on_press(move |tx| {
                *sink.lock().unwrap() = Some(tx.id);
            })
            .press(&haptics);

        assert_eq!(*seen.lock().unwrap(), Some(42));
    }
}
