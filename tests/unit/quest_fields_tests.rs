/*!
 * Tests for quest field rewriting
 */

use anyhow::Result;
use questlate::errors::TranslationError;
use questlate::providers::mock::MockBackend;
use questlate::{FieldTransformer, QuestField};

use crate::common;

fn drop_second_placeholder(text: &str) -> String {
    text.replace("<<<2>>>", "")
}

fn uppercase(text: &str) -> String {
    text.to_uppercase()
}

/// With an identity model the file comes back byte for byte
#[tokio::test]
async fn test_transform_withIdentityModel_shouldKeepFileIdentical() -> Result<()> {
    let transformer = FieldTransformer::new(common::client_for(MockBackend::identity()));

    let content = common::sample_quest();
    let translated = transformer.transform(content, "ru").await?;

    assert_eq!(translated, content);
    Ok(())
}

/// Control codes survive around translated text
#[tokio::test]
async fn test_transform_withCodedTitle_shouldKeepCodes() -> Result<()> {
    let transformer = FieldTransformer::new(common::client_for(MockBackend::custom(uppercase)));

    let translated = transformer.transform("title: \"A &4B\"\n", "de").await?;

    assert_eq!(translated, "title: \"A &4B\"\n");
    let translated = transformer.transform("title: \"&6gold &rore\"\n", "de").await?;
    assert_eq!(translated, "title: \"&6GOLD &rORE\"\n");
    Ok(())
}

/// Everything outside the field bodies stays untouched
#[tokio::test]
async fn test_transform_withTaggedModel_shouldOnlyRewriteBodies() -> Result<()> {
    let transformer = FieldTransformer::new(common::client_for(MockBackend::tagged()));

    let content = "{\n\ttitle: \"Wood\"\n\tsubtitle: \"Punch a tree\"\n\tid: \"0011\"\n\tx: 2.0d\n}\n";
    let translated = transformer.transform(content, "fr").await?;

    assert_eq!(
        translated,
        "{\n\ttitle: \"[fr] Wood\"\n\tsubtitle: \"[fr] Punch a tree\"\n\tid: \"0011\"\n\tx: 2.0d\n}\n"
    );
    Ok(())
}

/// Description lists are sent whole, keeping their surrounding whitespace
#[tokio::test]
async fn test_transform_withDescription_shouldKeepListLayout() -> Result<()> {
    let transformer = FieldTransformer::new(common::client_for(MockBackend::custom(uppercase)));

    let content = "\tdescription: [\n\t\t\"&aFirst line\"\n\t\t\"Second\"\n\t]\n";
    let translated = transformer.transform(content, "es").await?;

    assert_eq!(translated, "\tdescription: [\n\t\t\"&aFIRST LINE\"\n\t\t\"SECOND\"\n\t]\n");
    Ok(())
}

/// Every occurrence of a field in a file is translated
#[tokio::test]
async fn test_transform_withSeveralQuests_shouldTranslateEachTitle() -> Result<()> {
    let transformer = FieldTransformer::new(common::client_for(MockBackend::tagged()));

    let content = "\t\t{\n\t\t\ttitle: \"One\"\n\t\t}\n\t\t{\n\t\t\ttitle: \"Two\"\n\t\t}\n";
    let translated = transformer.transform(content, "it").await?;

    assert_eq!(QuestField::Title.find_bodies(&translated), vec!["[it] One", "[it] Two"]);
    Ok(())
}

/// Bodies made only of codes or punctuation never reach the model
#[tokio::test]
async fn test_transform_withoutTranslatableText_shouldSkipModel() -> Result<()> {
    let backend = MockBackend::tagged();
    let translations = backend.translation_counter();
    let transformer = FieldTransformer::new(common::client_for(backend));

    let content = "title: \"\"\nsubtitle: \"&6&l - \"\ndescription: []\n";
    let translated = transformer.transform(content, "de").await?;

    assert_eq!(translated, content);
    assert_eq!(translations.load(std::sync::atomic::Ordering::SeqCst), 0);
    Ok(())
}

/// A lost placeholder drops its code but the file is still written
#[tokio::test]
async fn test_translate_body_withDroppedPlaceholder_shouldLoseOnlyThatCode() -> Result<()> {
    let transformer = FieldTransformer::new(common::client_for(MockBackend::custom(drop_second_placeholder)));

    let translated = transformer.translate_body("&4A &eB &rC", "de").await?;

    assert_eq!(translated, "&4A B &rC");
    Ok(())
}

/// Strict mode turns a placeholder mismatch into an error
#[tokio::test]
async fn test_translate_body_withStrictPlaceholders_shouldFailOnMismatch() {
    let transformer = FieldTransformer::new(common::client_for(MockBackend::custom(drop_second_placeholder)))
        .with_strict_placeholders(true);

    let result = transformer.translate_body("&4A &eB &rC", "de").await;

    match result {
        Err(TranslationError::PlaceholderMismatch { text, report }) => {
            assert_eq!(text, "<<<1>>>A <<<2>>>B <<<3>>>C");
            assert_eq!(report.missing, vec![2]);
        }
        other => panic!("Expected placeholder mismatch, got {:?}", other),
    }
}

/// A failing model fails the whole transform
#[tokio::test]
async fn test_transform_withFailingModel_shouldReturnProviderError() {
    let transformer = FieldTransformer::new(common::client_for(MockBackend::failing_translate()));

    let result = transformer.transform("title: \"Hello\"\n", "de").await;

    assert!(matches!(result, Err(TranslationError::Provider(_))));
}

/// Only the selected fields are rewritten, always in the fixed order
#[tokio::test]
async fn test_with_fields_withSubset_shouldLeaveOtherFields() -> Result<()> {
    let transformer = FieldTransformer::new(common::client_for(MockBackend::tagged()))
        .with_fields(&[QuestField::Description, QuestField::Title, QuestField::Title]);

    assert_eq!(transformer.fields(), &[QuestField::Title, QuestField::Description]);

    let content = "title: \"T\"\nsubtitle: \"S\"\ndescription: [\"D\"]\n";
    let translated = transformer.transform(content, "ru").await?;

    assert_eq!(translated, "title: \"[ru] T\"\nsubtitle: \"S\"\ndescription: [[ru] \"D\"]\n");
    Ok(())
}

/// Keys after a brace or comma are found anywhere on the line
#[tokio::test]
async fn test_transform_withInlineCompound_shouldTranslateTitle() -> Result<()> {
    let transformer = FieldTransformer::new(common::client_for(MockBackend::tagged()));

    let content = "tasks: [{ id: \"1\", title: \"Logs\", type: \"item\" }]\n";
    let translated = transformer.transform(content, "de").await?;

    assert_eq!(translated, "tasks: [{ id: \"1\", title: \"[de] Logs\", type: \"item\" }]\n");
    Ok(())
}

/// Title and subtitle sharing a line are both translated
#[tokio::test]
async fn test_transform_withFieldsOnOneLine_shouldTranslateBoth() -> Result<()> {
    let transformer = FieldTransformer::new(common::client_for(MockBackend::tagged()));

    let translated = transformer.transform("\ttitle: \"A\", subtitle: \"B\"\n", "de").await?;

    assert_eq!(translated, "\ttitle: \"[de] A\", subtitle: \"[de] B\"\n");
    Ok(())
}

/// A key written inside a description line is text, not a field
#[tokio::test]
async fn test_transform_withKeyInsideDescription_shouldOnlyTranslateDescription() -> Result<()> {
    let transformer = FieldTransformer::new(common::client_for(MockBackend::tagged()));

    let content = "description: [\n\t\"Read this, title: \\\"fake\\\"\"\n]\n";
    let translated = transformer.transform(content, "de").await?;

    assert_eq!(
        translated,
        "description: [\n\t[de] \"Read this, title: \\\"fake\\\"\"\n]\n"
    );
    Ok(())
}
