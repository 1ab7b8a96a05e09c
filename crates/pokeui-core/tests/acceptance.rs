//! The fixture pages driven end to end through a chained run.

mod common;

use std::sync::Arc;

use pokeui_core::label::ElementCategory::{Any, Area, Button, Decoration, FormField};
use pokeui_core::pattern::MatchExpression;
use pokeui_core::suite::{test_document, DocumentOptions, Outcome, RunReport, SuiteRunner, TestDocument};

use common::{fixture_host, BUTTON, DRAG_DROP, INPUT, MATCHING};

const CLEAR: DocumentOptions = DocumentOptions { clear_on_finish: true };

fn matching_suite() -> TestDocument {
    test_document(MATCHING, CLEAR)
        .use_case("Button matcher", |ui| {
            Box::pin(async move {
                ui.count_elements_with_label(Button, "Click aside", 1)?;
                ui.count_elements_with_label(Button, "Click an icon", 1)?;
                ui.count_elements_with_label(Button, "Click another icon", 1)?;
                ui.count_elements_with_label(Button, "😁", 2)?;
                ui.count_elements_with_label(Button, "Complex label", 1)?;
                ui.count_elements_with_label(Button, "*=ex la", 1)?;
                ui.count_elements_with_label(Button, "^=Compl", 1)?;
                ui.count_elements_with_label(Button, "$=abel", 1)?;
                Ok(())
            })
        })
        .use_case("Form field matcher", |ui| {
            Box::pin(async move {
                ui.count_elements_with_label(FormField, "Some input", 1)?;
                ui.count_elements_with_label(FormField, "Input 1's value", 1)?;
                ui.field_should_have_value("Some input", "Input 1's value")?;

                ui.count_elements_with_label(FormField, "Input 2", 1)?;
                ui.count_elements_with_label(FormField, "Input 2's value", 1)?;
                ui.field_should_have_value("Input 2", "Input 2's value")?;

                ui.count_elements_with_label(FormField, MatchExpression::regex(r"Input \d's", "")?, 2)?;

                ui.count_elements_with_label(FormField, "Some select", 1)?;
                ui.count_elements_with_label(FormField, "option 1", 1)?;
                ui.field_should_have_value("Some select", "option 1")?;

                ui.count_elements_with_label(FormField, "Some text area", 1)?;
                ui.count_elements_with_label(FormField, "There once was a text area.", 1)?;
                ui.field_should_have_value("Some text area", "There once was a text area.")?;
                ui.field_should_have_value("Some text area", "*=once")?;
                ui.field_should_have_value("Some text area", "^=There once")?;
                ui.field_should_have_value("Some text area", "$=text area.")?;
                ui.field_should_have_value("Some text area", MatchExpression::regex("there once.+text", "i")?)?;
                Ok(())
            })
        })
        .use_case("Area matcher", |ui| {
            Box::pin(async move {
                let expectations = [
                    ("*=Inline text", "You clicked a main"),
                    ("I'm a fake region", "You clicked a div#fake-region"),
                    ("Not going anywhere", "You clicked a div#labelled-fake-region"),
                    ("Some text area", "You clicked a fieldset"),
                    ("Some select", "You clicked a form"),
                    ("Header text", "You clicked a header"),
                    ("Footer text", "You clicked a footer"),
                    ("Click aside", "You clicked a aside"),
                    ("Section text", "You clicked a section"),
                ];
                for (area, report) in expectations {
                    ui.click_element(Area, area)?;
                    ui.count_elements_with_label(Any, report, 1)?;
                }
                Ok(())
            })
        })
        .use_case("Decoration matcher", |ui| {
            Box::pin(async move {
                ui.click_element(Decoration, "Click aside")?;
                ui.count_elements_with_label(Any, "You clicked a span", 1)?;
                ui.no_elements_match(Decoration, "I'm a fake region")?;
                Ok(())
            })
        })
        .use_case("Any element matcher", |ui| {
            Box::pin(async move {
                ui.count_elements_with_label(Any, "I'm a fake region", 1)?;
                ui.count_elements_with_label(Any, MatchExpression::regex("region", "")?, 4)?;
                Ok(())
            })
        })
}

fn click_suite() -> TestDocument {
    test_document(BUTTON, CLEAR)
        .use_case("Click once", |ui| {
            Box::pin(async move {
                ui.click_element(Button, "Click this")?;
                ui.count_elements_with_label(Any, "1 clicks", 1)
            })
        })
        .use_case("Click multiple times", |ui| {
            Box::pin(async move {
                for _ in 0..3 {
                    ui.click_element(Button, "Click this")?;
                }
                ui.count_elements_with_label(Any, "3 clicks", 1)
            })
        })
}

fn typing_suite() -> TestDocument {
    test_document(INPUT, CLEAR)
        .use_case("Type some text", |ui| {
            Box::pin(async move {
                ui.click_element(FormField, "My text")?;
                ui.type_into_focused_field("some text").await?;
                ui.count_elements_with_label(Any, "You typed some text", 1)
            })
        })
        .use_case("Paste text", |ui| {
            Box::pin(async move {
                ui.click_element(FormField, "My text")?;
                ui.paste_into_focused_field("some text")?;
                ui.count_elements_with_label(Any, "You typed some text", 1)
            })
        })
}

fn drag_drop_suite() -> TestDocument {
    test_document(DRAG_DROP, CLEAR)
        .use_case("Grab the draggable", |ui| {
            Box::pin(async move {
                ui.grab_element(Any, "Drag me")?;
                ui.count_elements_with_label(Any, "Bring it over", 1)
            })
        })
        .use_case("Drag over", |ui| {
            Box::pin(async move {
                ui.grab_element(Any, "Drag me")?;
                ui.drag_grabbed_element_over(Any, "Bring it over").await?;
                ui.count_elements_with_label(Any, "Drop it now", 1)
            })
        })
        .use_case("Drop", |ui| {
            Box::pin(async move {
                ui.grab_element(Any, "Drag me")?;
                ui.drag_grabbed_element_over(Any, "Bring it over").await?;
                ui.drop_grabbed_element()?;
                ui.count_elements_with_label(Any, "There you go!", 1)
            })
        })
}

fn assert_all_passed(report: &RunReport) {
    for suite in &report.suites {
        for use_case in &suite.use_cases {
            assert_eq!(
                use_case.outcome,
                Outcome::Passed,
                "{} / {} did not pass",
                suite.document,
                use_case.name
            );
        }
    }
}

#[tokio::test]
async fn test_fixture_pages_pass_in_chain() {
    let host = Arc::new(fixture_host());
    let report = SuiteRunner::new(host.clone())
        .then(matching_suite)
        .then(click_suite)
        .then(typing_suite)
        .then(drag_drop_suite)
        .run()
        .await;

    assert_all_passed(&report);
    let documents: Vec<_> = report.suites.iter().map(|suite| suite.document.as_str()).collect();
    assert_eq!(documents, [MATCHING, BUTTON, INPUT, DRAG_DROP]);
    assert_eq!(report.passed_count(), 12);
    assert!(report.suites.iter().all(|suite| suite.cleared));
    assert_eq!(host.clear_count(), 4);
    // One fresh load per use-case.
    assert_eq!(host.load_count(), 12);
}

#[tokio::test]
async fn test_use_cases_see_fresh_documents() {
    // Each click suite case starts from "0 clicks" even though the previous
    // one clicked.
    let host = Arc::new(fixture_host());
    let report = SuiteRunner::new(host)
        .suite(click_suite())
        .suite(click_suite())
        .run()
        .await;
    assert_all_passed(&report);
}

#[tokio::test]
async fn test_actions_are_reported_per_use_case() {
    let host = Arc::new(fixture_host());
    let report = SuiteRunner::new(host).then(click_suite).run().await;
    let actions: Vec<_> = report.suites[0].use_cases[1]
        .actions
        .iter()
        .map(|log| log.action.name())
        .collect();
    assert_eq!(actions, ["click", "click", "click", "count_elements"]);
}
