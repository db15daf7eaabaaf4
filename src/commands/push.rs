//! Push command - send a notification by hand.

use crate::cli::args::{PushAction, PushArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::services::ServiceContainer;

pub async fn execute(args: PushArgs, config: Config) -> AppResult<()> {
    match args.action {
        PushAction::Send {
            token,
            title,
            body,
            data,
        } => {
            let data = parse_data(data.as_deref())?;
            let services = super::connect_services(config).await?;

            let response = services
                .notifications()
                .send_push_notification(&token, &title, &body, data)
                .await
                .ok_or_else(|| AppError::internal("Push notification was not delivered"))?;

            for ticket in &response.data {
                println!(
                    "{} {}",
                    ticket.status,
                    ticket.id.as_deref().or(ticket.message.as_deref()).unwrap_or("")
                );
            }
        }
    }

    Ok(())
}

fn parse_data(raw: Option<&str>) -> AppResult<Option<serde_json::Value>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| AppError::validation(format!("--data is not valid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(AppError::validation("--data must be a JSON object"));
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_must_be_json_object() {
        assert!(parse_data(None).unwrap().is_none());
        assert_eq!(
            parse_data(Some(r#"{"transaction_id": 7}"#)).unwrap(),
            Some(serde_json::json!({ "transaction_id": 7 }))
        );
        assert!(matches!(parse_data(Some("[1,2]")), Err(AppError::Validation(_))));
        assert!(matches!(parse_data(Some("{oops")), Err(AppError::Validation(_))));
    }
}
