//! Rotation CLI commands

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::output::{describe_period, Output};
use crate::domain::period_for;
use crate::storage::Project;

/// Parses an RFC 3339 instant or a `YYYY-MM-DD` date (midnight UTC)
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}': expected RFC 3339 or YYYY-MM-DD", input))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

pub fn current(project: &Project, output: &Output, read_only: bool) -> Result<()> {
    let engine = project.engine()?;
    let owner = if read_only {
        engine.current_owner_read_only()?
    } else {
        engine.current_owner()?
    };

    if output.is_json() {
        output.data(&owner);
    } else {
        println!("{}", owner.identity);
    }

    Ok(())
}

pub fn skip(project: &Project, output: &Output) -> Result<()> {
    let owner = project.engine()?.advance_to_next()?;

    if output.is_json() {
        output.data(&owner);
    } else {
        output.success(&format!("Skipped to {}", owner.identity));
    }

    Ok(())
}

pub fn set(project: &Project, output: &Output, identity: &str) -> Result<()> {
    let owner = project.engine()?.set_owner(identity)?;

    if output.is_json() {
        output.data(&owner);
    } else {
        output.success(&format!("{} is now on duty", owner.identity));
    }

    Ok(())
}

pub fn schedule(project: &Project, output: &Output, periods: Option<u32>) -> Result<()> {
    let periods = periods.unwrap_or(project.config().project.schedule_periods);
    let schedule = project.engine()?.upcoming_schedule(periods)?;

    if output.is_json() {
        output.data(&schedule);
        return Ok(());
    }

    for entry in &schedule {
        output.row(&[
            &entry.position.to_string(),
            &entry.owner.identity,
            &describe_period(&entry.period),
        ]);
    }

    Ok(())
}

pub fn owner_on(project: &Project, output: &Output, date: &str) -> Result<()> {
    let target = parse_date(date)?;
    let engine = project.engine()?;
    let owner = engine.owner_on_date(target)?;
    let period = period_for(target, &engine.state()?.config);

    if output.is_json() {
        output.data(&serde_json::json!({
            "owner": owner,
            "periodInfo": period,
        }));
    } else {
        println!("{}\t{}", owner.identity, describe_period(&period));
    }

    Ok(())
}

pub fn period(project: &Project, output: &Output, date: Option<&str>) -> Result<()> {
    let engine = project.engine()?;
    let target = match date {
        Some(date) => parse_date(date)?,
        None => engine.now(),
    };
    let period = period_for(target, &engine.state()?.config);

    if output.is_json() {
        output.data(&period);
    } else {
        println!("{}", describe_period(&period));
    }

    Ok(())
}

pub fn notify(project: &Project, output: &Output) -> Result<()> {
    let notification = project.engine()?.notification()?;

    if output.is_json() {
        output.data(&notification);
    } else {
        println!(
            "{} is on duty for {}",
            notification.owner.identity,
            describe_period(&notification.period)
        );
    }

    Ok(())
}

pub fn validate(project: &Project, output: &Output) -> Result<()> {
    let report = project.engine()?.validate()?;

    if output.is_json() {
        output.data(&report);
    } else if report.valid {
        output.success("Rotation state is valid");
    } else {
        for error in &report.errors {
            println!("- {}", error);
        }
    }

    if !report.valid {
        bail!("Rotation state has {} problem(s)", report.errors.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_plain_dates_as_utc_midnight() {
        assert_eq!(
            parse_date("2024-03-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        assert_eq!(
            parse_date("2024-03-01T02:00:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_date("next tuesday").unwrap_err();
        assert!(err.to_string().contains("next tuesday"));
    }
}
