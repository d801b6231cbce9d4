use crate::PolicyArgs;
use crate::ui::Theme;
use anyhow::Result;
use crossterm::style::Stylize;
use reap_core::cutoff_for;
use reap_schema::RetentionPolicy;

/// Validate the policy file and print every company's cutoff at the
/// reference instant.
pub fn check(args: &PolicyArgs) -> Result<()> {
    let (path, policies) = super::load_policies(args.policy.as_deref())?;
    let now = args.reference_instant();
    let theme = Theme::default();

    println!();
    println!("  {} {}", "Policy".bold(), path.display());
    println!("  {}", format!("now {now}").with(theme.colors.secondary));
    println!();

    let header = format!(
        "  {:<cw$} {:>dw$}   {}",
        "company",
        "days",
        "cutoff",
        cw = theme.layout.company_width,
        dw = theme.layout.days_width,
    );
    println!("{}", header.with(theme.colors.header));

    print_row(&theme, policies.default_policy(), now, true);
    for policy in policies.overrides() {
        print_row(&theme, policy, now, false);
    }

    println!();
    println!(
        "  {}",
        format!("{} company overrides", policies.override_count()).with(theme.colors.secondary)
    );
    Ok(())
}

fn print_row(theme: &Theme, policy: &RetentionPolicy, now: chrono::NaiveDateTime, is_default: bool) {
    let mut label = policy.company_id.clone();
    if let Some(name) = &policy.company_name {
        label = format!("{label} ({name})");
    }
    let label = format!("{label:<width$}", width = theme.layout.company_width);
    let label = if is_default {
        label.with(theme.colors.secondary)
    } else {
        label.with(theme.colors.company)
    };
    println!(
        "  {} {:>dw$}   {}",
        label,
        policy.retention_days,
        cutoff_for(policy, now),
        dw = theme.layout.days_width,
    );
}
