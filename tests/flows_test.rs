use anyhow::Result;
use async_trait::async_trait;

use redmark::flows::Grader;
use redmark::flows::relevance::{
    AlwaysRelevant, RelevanceCheck, RelevanceRequest, determine_image_relevance,
};
use redmark::flows::report::{GradingRequest, generate_grading_report};
use redmark::image::DataUri;
use redmark::model::mock::MockModel;
use redmark::model::{ModelReply, TokenUsage};

// 1x1-ish fake photo payload; content is irrelevant, the URI shape is not
const PHOTO: &str = "data:image/jpeg;base64,aGFuZHdyaXR0ZW4gbWF0aA==";

fn grading_request() -> GradingRequest {
    GradingRequest {
        photo_data_uri: PHOTO.to_string(),
        task_criteria: "Show all work and explain your reasoning clearly.".to_string(),
    }
}

fn relevance_request() -> RelevanceRequest {
    RelevanceRequest {
        image_data_uri: PHOTO.to_string(),
        task_criteria: "Show all work and explain your reasoning clearly.".to_string(),
        task_description: "Mathematics Midterm Exam for Grade 10".to_string(),
    }
}

#[tokio::test]
async fn report_flow_returns_report() {
    let model = MockModel::replying(&[r#"{"report": "Работа выполнена аккуратно."}"#]);

    let (report, _) = generate_grading_report(&model, &AlwaysRelevant, &grading_request())
        .await
        .unwrap();

    assert!(!report.report.is_empty());
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn report_flow_sends_image_and_criteria_to_model() {
    let model = MockModel::replying(&[r#"{"report": "ok"}"#]);
    generate_grading_report(&model, &AlwaysRelevant, &grading_request())
        .await
        .unwrap();

    let requests = model.requests();
    assert_eq!(requests[0].image.mime(), "image/jpeg");
    assert!(requests[0].prompt.contains("Show all work"));
    assert!(requests[0].instructions.contains("check_relevance"));
}

#[tokio::test]
async fn report_flow_runs_relevance_tool_then_finishes() {
    let model = MockModel::replying(&[
        r#"{"tool": "check_relevance"}"#,
        r#"{"report": "Работа соответствует заданию."}"#,
    ]);

    let (report, _) = generate_grading_report(&model, &AlwaysRelevant, &grading_request())
        .await
        .unwrap();

    assert!(!report.report.is_empty());
    assert_eq!(model.calls(), 2);
    // The second round carries the tool result back to the model
    assert!(model.requests()[1].prompt.contains("check_relevance -> true"));
}

#[tokio::test]
async fn report_flow_feeds_injected_capability_result() {
    struct NeverRelevant;

    #[async_trait]
    impl RelevanceCheck for NeverRelevant {
        async fn evaluate(&self, _image: &DataUri, _criteria: &str) -> Result<bool> {
            Ok(false)
        }
    }

    let model = MockModel::replying(&[
        r#"{"tool": "check_relevance"}"#,
        r#"{"report": "Изображение не относится к заданию."}"#,
    ]);

    generate_grading_report(&model, &NeverRelevant, &grading_request())
        .await
        .unwrap();

    assert!(model.requests()[1].prompt.contains("check_relevance -> false"));
}

#[tokio::test]
async fn report_flow_bounds_tool_rounds() {
    let model = MockModel::replying(&[
        r#"{"tool": "check_relevance"}"#,
        r#"{"tool": "check_relevance"}"#,
        r#"{"tool": "check_relevance"}"#,
        r#"{"tool": "check_relevance"}"#,
    ]);

    let err = generate_grading_report(&model, &AlwaysRelevant, &grading_request())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("rounds"));
    assert_eq!(model.calls(), 3);
}

#[tokio::test]
async fn report_flow_rejects_malformed_uri_before_dispatch() {
    let model = MockModel::replying(&[r#"{"report": "should never be produced"}"#]);
    let request = GradingRequest {
        photo_data_uri: "image/jpeg;base64,aGk=".to_string(), // no data: prefix
        task_criteria: "Show all work.".to_string(),
    };

    let result = generate_grading_report(&model, &AlwaysRelevant, &request).await;

    assert!(result.is_err());
    assert_eq!(model.calls(), 0, "a well-formed mock must not receive bad input");
}

#[tokio::test]
async fn report_flow_rejects_empty_criteria_before_dispatch() {
    let model = MockModel::replying(&[r#"{"report": "unused"}"#]);
    let request = GradingRequest {
        photo_data_uri: PHOTO.to_string(),
        task_criteria: "   ".to_string(),
    };

    assert!(
        generate_grading_report(&model, &AlwaysRelevant, &request)
            .await
            .is_err()
    );
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn report_flow_surfaces_schema_violation() {
    let model = MockModel::replying(&["I think the student did well overall."]);

    let err = generate_grading_report(&model, &AlwaysRelevant, &grading_request())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("not valid JSON"));
}

#[tokio::test]
async fn report_flow_surfaces_transport_failure() {
    let model = MockModel::failing("connection reset by peer");

    let err = generate_grading_report(&model, &AlwaysRelevant, &grading_request())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("connection reset"));
}

#[tokio::test]
async fn relevance_flow_returns_structured_verdict() {
    let model = MockModel::replying(
        &[r#"{"isRelevant": true, "reason": "the photo shows the worked solution"}"#],
    );

    let (verdict, _) = determine_image_relevance(&model, &relevance_request())
        .await
        .unwrap();

    assert!(verdict.is_relevant);
    assert!(!verdict.reason.is_empty());
}

#[tokio::test]
async fn relevance_flow_sends_description_and_criteria() {
    let model = MockModel::replying(&[r#"{"isRelevant": false, "reason": "photo of a cat"}"#]);
    determine_image_relevance(&model, &relevance_request())
        .await
        .unwrap();

    let request = &model.requests()[0];
    assert!(request.prompt.contains("Mathematics Midterm Exam for Grade 10"));
    assert!(request.prompt.contains("Show all work"));
}

#[tokio::test]
async fn relevance_flow_rejects_empty_description_before_dispatch() {
    let model = MockModel::replying(&[r#"{"isRelevant": true, "reason": "unused"}"#]);
    let request = RelevanceRequest {
        task_description: String::new(),
        ..relevance_request()
    };

    assert!(determine_image_relevance(&model, &request).await.is_err());
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn relevance_flow_rejects_nonconforming_reply() {
    let model = MockModel::replying(&[r#"{"relevant": true}"#]);

    assert!(
        determine_image_relevance(&model, &relevance_request())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn grader_accumulates_usage_across_flows() {
    let replies = vec![
        Ok(ModelReply {
            text: r#"{"report": "ok"}"#.to_string(),
            usage: Some(TokenUsage {
                input_tokens: 100,
                output_tokens: 20,
            }),
        }),
        Ok(ModelReply {
            text: r#"{"isRelevant": true, "reason": "matches"}"#.to_string(),
            usage: Some(TokenUsage {
                input_tokens: 50,
                output_tokens: 10,
            }),
        }),
    ];
    let grader = Grader::with_stub_relevance(Box::new(MockModel::new(replies)));

    grader.grade(&grading_request()).await.unwrap();
    grader.check_relevance(&relevance_request()).await.unwrap();

    let usage = grader.session_usage();
    assert_eq!(usage.input_tokens, 150);
    assert_eq!(usage.output_tokens, 30);
    assert_eq!(usage.total(), 180);
}

#[tokio::test]
async fn grader_failure_leaves_session_usable() {
    let replies = vec![
        Err("model overloaded".to_string()),
        Ok(ModelReply {
            text: r#"{"report": "Подробный отчёт."}"#.to_string(),
            usage: None,
        }),
    ];
    let grader = Grader::with_stub_relevance(Box::new(MockModel::new(replies)));

    assert!(grader.grade(&grading_request()).await.is_err());
    // The next request on the same grader succeeds
    let report = grader.grade(&grading_request()).await.unwrap();
    assert!(!report.report.is_empty());
}
