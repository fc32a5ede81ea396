//! Tabular report of the analytics results.
//!
//! The format is a `Metric,Value` block with the event-wide numbers,
//! followed by the per-option table. Quadratic scores are rendered with
//! exactly two decimal digits.

use quadratic_voting::AnalyticsResult;

pub fn render_csv_report(res: &AnalyticsResult) -> String {
    let mut out = String::new();

    out.push_str("Metric,Value\n");
    push_metric(&mut out, "Event", &res.event_id);
    push_metric(&mut out, "Total Votes", &res.summary.total_votes.to_string());
    push_metric(
        &mut out,
        "Unique Voters",
        &res.summary.unique_voters.to_string(),
    );
    push_metric(
        &mut out,
        "Average Credits Used",
        &format!("{:.2}", res.summary.avg_credits_used),
    );
    push_metric(
        &mut out,
        "Max Credits Used",
        &res.summary.max_credits_used.to_string(),
    );
    push_metric(
        &mut out,
        "Min Credits Used",
        &res.summary.min_credits_used.to_string(),
    );
    push_metric(
        &mut out,
        "Total Clusters",
        &res.cluster_summary.total_clusters.to_string(),
    );
    push_metric(
        &mut out,
        "Diversity Score",
        &format!("{:.2}", res.cluster_summary.diversity),
    );

    out.push('\n');
    out.push_str("Option,Credits,Votes,Quadratic Score\n");
    for agg in res.option_aggregates.iter() {
        out.push_str(&format!(
            "{},{},{},{:.2}\n",
            csv_field(&agg.title),
            agg.total_credits,
            agg.vote_count,
            agg.quadratic_score
        ));
    }
    out
}

fn push_metric(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!("{},{}\n", csv_field(name), csv_field(value)));
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
