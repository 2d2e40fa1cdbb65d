//! Terminal rendering for suggestion bundles and photo reviews.

use inspecta_core::{FieldTag, SuggestionBundle};
use inspecta_review::{FieldStatus, PhotoReview, format_citation};

const MAX_LIST_ITEMS: usize = 10;

pub fn print_bundle(bundle: &SuggestionBundle) {
    println!(
        "Suggested code   {} ({}% confidence)",
        bundle.suggested_code(),
        bundle.confidence_percent()
    );
    println!("Description      {}", bundle.enhanced_description());
    if let Some(recommendation) = bundle.recommendation() {
        println!("Recommendation   {recommendation}");
    }
    if let Some(citation) = format_citation(bundle.regulations()) {
        println!("Regulations      {citation}");
    }
    if let Some(explanation) = bundle.explanation() {
        println!("Why              {explanation}");
    }
}

pub fn print_statuses(statuses: &[(FieldTag, FieldStatus)]) {
    println!();
    for (tag, status) in statuses {
        println!("  {:<16} {}", tag.as_str(), status.as_str());
    }
}

fn print_list(heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{heading}:");
    for item in items.iter().take(MAX_LIST_ITEMS) {
        println!("  - {item}");
    }
    if items.len() > MAX_LIST_ITEMS {
        println!("  ... and {} more", items.len() - MAX_LIST_ITEMS);
    }
}

pub fn print_review(review: &PhotoReview) {
    let analysis = &review.analysis;
    println!("{} ({:.0}% confidence)", review.verdict, analysis.confidence);
    if !analysis.feedback.is_empty() {
        println!("{}", analysis.feedback);
    }
    print_list("Safety features", &analysis.findings.safety_features);
    print_list("Concerns", &analysis.findings.concerns);
    print_list("Check in person", &analysis.findings.not_verifiable);
    if !analysis.guidance.summary.is_empty() {
        println!("Guidance: {}", analysis.guidance.summary);
    }
    print_list("Follow-up checks", &analysis.guidance.follow_up_checks);
    if let Some(quality) = analysis.photo_quality.as_ref().filter(|q| !q.adequate) {
        print_list("Photo quality issues", &quality.issues);
    }
    if review.verdict.requires_manual_review() {
        println!("Manual review required.");
    }
}
