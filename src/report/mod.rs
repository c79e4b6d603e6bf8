//! PDF financial report for a stored analysis

pub mod pdf;

pub use pdf::{Font, PdfWriter};

use crate::models::AnalysisResult;
use crate::simulation::format_inr;
use crate::Result;
use tracing::info;

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 11.0;
const INDENT: f32 = 14.0;

pub const CONTENT_TYPE: &str = "application/pdf";

/// `attachment; filename=financial-report-<id>.pdf`
pub fn content_disposition(questionnaire_id: &str) -> String {
    format!(
        "attachment; filename=financial-report-{}.pdf",
        questionnaire_id
    )
}

fn rupees(amount: f64) -> String {
    format!("Rs. {}", format_inr(amount))
}

fn heading(pdf: &mut PdfWriter, text: &str) {
    pdf.space(10.0);
    pdf.text(Font::Bold, HEADING_SIZE, 0.0, text);
    pdf.space(4.0);
}

fn bullets(pdf: &mut PdfWriter, items: &[String]) {
    for item in items {
        pdf.text(Font::Regular, BODY_SIZE, INDENT, &format!("- {}", item));
    }
}

/// Render the full report for one questionnaire's analysis
pub fn render_report(questionnaire_id: &str, analysis: &AnalysisResult) -> Result<Vec<u8>> {
    let pdf = layout_report(questionnaire_id, analysis);
    let pages = pdf.page_count();
    let bytes = pdf.finish()?;

    info!(
        questionnaire_id = questionnaire_id,
        pages,
        bytes = bytes.len(),
        "Rendered financial report"
    );

    Ok(bytes)
}

/// Place every report section onto pages without serializing
pub fn layout_report(questionnaire_id: &str, analysis: &AnalysisResult) -> PdfWriter {
    let mut pdf = PdfWriter::new(format!("Balancify Financial Report {}", questionnaire_id));

    pdf.text(Font::Bold, TITLE_SIZE, 0.0, "Balancify Financial Report");
    pdf.text(
        Font::Regular,
        BODY_SIZE,
        0.0,
        &format!(
            "Questionnaire {} - generated {}",
            questionnaire_id,
            analysis.generated_at.format("%Y-%m-%d %H:%M UTC")
        ),
    );

    heading(&mut pdf, "Monthly Spending Breakdown");
    for (category, amount) in analysis.spending_breakdown.categories() {
        pdf.text(
            Font::Regular,
            BODY_SIZE,
            INDENT,
            &format!("{}: {}", category, rupees(amount)),
        );
    }

    let split = &analysis.needs_wants_analysis;
    heading(&mut pdf, "Needs vs Wants");
    pdf.text(
        Font::Regular,
        BODY_SIZE,
        0.0,
        &format!(
            "Needs: {}% ({})    Wants: {}% ({})",
            split.needs_percentage,
            rupees(split.needs.total()),
            split.wants_percentage,
            rupees(split.wants.total())
        ),
    );

    let timeline = &analysis.goal_timeline;
    heading(&mut pdf, "Goal Timeline");
    for line in [
        format!("Goal: {}", timeline.goal_description),
        format!("Target: {}", rupees(timeline.target_amount)),
        format!("Monthly contribution: {}", rupees(timeline.monthly_contribution)),
        format!("Estimated time to goal: {} months", timeline.time_to_goal),
    ] {
        pdf.text(Font::Regular, BODY_SIZE, INDENT, &line);
    }
    for milestone in &timeline.milestones {
        pdf.text(
            Font::Regular,
            BODY_SIZE,
            INDENT * 2.0,
            &format!("{}: {}", milestone.description, rupees(milestone.amount)),
        );
    }

    if !analysis.goal_projections.is_empty() {
        heading(&mut pdf, "All Goals");
        for projection in &analysis.goal_projections {
            pdf.text(
                Font::Regular,
                BODY_SIZE,
                INDENT,
                &format!(
                    "{} ({} priority): {} remaining, about {} months",
                    projection.description,
                    projection.priority,
                    rupees(projection.remaining_amount),
                    projection.months_to_goal
                ),
            );
        }
    }

    let insights = &analysis.insights;
    heading(&mut pdf, "AI Insights");
    for (label, text) in [
        ("Spending Patterns", &insights.spending_patterns),
        ("Optimization Opportunities", &insights.optimization_opportunities),
        ("Investment Recommendations", &insights.investment_recommendations),
        ("Risk Analysis", &insights.risk_analysis),
        ("Goal Achievability", &insights.goal_achievability),
    ] {
        pdf.text(Font::Bold, BODY_SIZE, 0.0, label);
        pdf.text(Font::Regular, BODY_SIZE, INDENT, text);
        pdf.space(4.0);
    }

    let recommendations = &analysis.recommendations;
    heading(&mut pdf, "Recommendations");
    for (label, items) in [
        ("Immediate (1-3 months)", &recommendations.immediate),
        ("Short term (3-12 months)", &recommendations.short_term),
        ("Long term (1+ years)", &recommendations.long_term),
    ] {
        pdf.text(Font::Bold, BODY_SIZE, 0.0, label);
        bullets(&mut pdf, items);
    }
    pdf.text(Font::Bold, BODY_SIZE, 0.0, "Emergency Fund");
    pdf.text(Font::Regular, BODY_SIZE, INDENT, &recommendations.emergency_fund);
    pdf.text(Font::Bold, BODY_SIZE, 0.0, "Investment Strategy");
    pdf.text(Font::Regular, BODY_SIZE, INDENT, &recommendations.investment_strategy);

    pdf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute_metrics;
    use crate::models::fixtures::sample_answers;
    use crate::models::{FinancialInsights, Recommendations};
    use chrono::Utc;

    fn sample_result() -> AnalysisResult {
        let answers = sample_answers();
        let metrics = compute_metrics(&answers);
        AnalysisResult {
            insights: FinancialInsights {
                spending_patterns: "Housing dominates (₹23,000)".to_string(),
                optimization_opportunities: "Trim shopping".to_string(),
                investment_recommendations: "Index funds".to_string(),
                risk_analysis: "Low debt".to_string(),
                goal_achievability: "On track".to_string(),
            },
            spending_breakdown: metrics.spending_breakdown,
            needs_wants_analysis: metrics.needs_wants_analysis,
            recommendations: Recommendations {
                immediate: vec!["Cancel unused subscriptions".to_string()],
                short_term: vec![],
                long_term: vec!["Retirement corpus".to_string()],
                emergency_fund: "6 months".to_string(),
                investment_strategy: "SIP".to_string(),
            },
            goal_timeline: metrics.goal_timeline,
            financial_goals: answers.financial_goals(),
            goal_projections: metrics.goal_projections,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_report_contents() {
        let pdf = layout_report("q-1", &sample_result());
        let rows: Vec<&str> = pdf.rows().iter().map(|row| row.text.as_str()).collect();

        assert_eq!(rows[0], "Balancify Financial Report");
        assert!(rows.contains(&"Housing: Rs. 23,000"));
        assert!(rows.contains(&"Savings: Rs. 47,000"));
        assert!(rows.iter().any(|row| row.starts_with("Needs: 78%")));
        assert!(rows.contains(&"Housing dominates (Rs. 23,000)"));
        assert!(rows.contains(&"6 month milestone: Rs. 3,42,000"));
        assert!(rows.contains(&"House down payment (high priority): Rs. 5,00,000 remaining, about 9 months"));
        assert!(rows.iter().all(|row| row.is_ascii()));
    }

    #[test]
    fn test_render_report_returns_pdf_bytes() {
        let bytes = render_report("q-1", &sample_result()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("abc"),
            "attachment; filename=financial-report-abc.pdf"
        );
    }
}
