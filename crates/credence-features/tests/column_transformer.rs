//! Integration tests for NamedColumnTransformer fit / transform / naming.

use credence_features::column_transformer::{FeatureSets, NamedColumnTransformer, TransformStep};
use credence_features::naming::substitute_all;
use credence_features::table::{Table, Value};
use credence_features::transform::{
    ImputeStrategy, NamedStage, OneHotEncoder, Pipeline, RobustScaler, SimpleImputer,
    StandardScaler, Transformer, WoeEncoder,
};
use credence_features::FeatureError;

fn applicants() -> Table {
    Table::from_columns(vec![
        (
            "AMT_INCOME_TOTAL",
            vec![
                Value::from(112500.0),
                Value::from(270000.0),
                Value::Missing,
                Value::from(135000.0),
            ],
        ),
        (
            "CODE_GENDER",
            vec!["M".into(), "F".into(), "F".into(), "M".into()],
        ),
        (
            "OCCUPATION_TYPE",
            vec!["Laborers".into(), "Managers".into(), Value::Missing, "Laborers".into()],
        ),
        ("SK_ID", vec![1.0.into(), 2.0.into(), 3.0.into(), 4.0.into()]),
    ])
    .unwrap()
}

const TARGET: [f64; 4] = [0.0, 1.0, 1.0, 0.0];

fn credit_steps() -> Vec<TransformStep> {
    vec![
        TransformStep::new(
            "numeric",
            Pipeline::new(vec![
                NamedStage::new("imputer", SimpleImputer::new(ImputeStrategy::Median)),
                NamedStage::new("scaler", RobustScaler::new()),
            ]),
            &["AMT_INCOME_TOTAL"],
        ),
        TransformStep::new(
            "categorical",
            Pipeline::new(vec![
                NamedStage::new("imputer", SimpleImputer::new(ImputeStrategy::MostFrequent)),
                NamedStage::new("onehot", OneHotEncoder::new()),
            ]),
            &["CODE_GENDER"],
        ),
        TransformStep::new(
            "special",
            Pipeline::new(vec![
                NamedStage::new("imputer", SimpleImputer::new(ImputeStrategy::MostFrequent)),
                NamedStage::new("woe", WoeEncoder::new()),
            ]),
            &["OCCUPATION_TYPE"],
        ),
    ]
}

fn credit_features() -> FeatureSets {
    FeatureSets::new(&["AMT_INCOME_TOTAL"], &["CODE_GENDER"], &["OCCUPATION_TYPE"])
}

// ---------------------------------------------------------------------------
// Initial features
// ---------------------------------------------------------------------------

#[test]
fn hard_mode_initial_features_are_declared_lists() {
    let mut ct = NamedColumnTransformer::new(credit_steps(), credit_features(), true);
    assert_eq!(
        ct.initial_features(),
        &["AMT_INCOME_TOTAL", "CODE_GENDER", "OCCUPATION_TYPE"]
    );
    ct.fit(&applicants(), Some(&TARGET)).unwrap();
    assert_eq!(
        ct.initial_features(),
        &["AMT_INCOME_TOTAL", "CODE_GENDER", "OCCUPATION_TYPE"]
    );
}

#[test]
fn non_hard_mode_initial_features_are_fit_columns() {
    let mut ct = NamedColumnTransformer::new(credit_steps(), credit_features(), false);
    ct.fit(&applicants(), Some(&TARGET)).unwrap();
    assert_eq!(
        ct.initial_features(),
        &["AMT_INCOME_TOTAL", "CODE_GENDER", "OCCUPATION_TYPE", "SK_ID"]
    );
}

#[test]
fn empty_feature_lists_are_allowed() {
    let steps = vec![TransformStep::new("raw", Transformer::Passthrough, &["SK_ID"])];
    let mut ct = NamedColumnTransformer::new(steps, FeatureSets::default(), false);
    let x = ct.fit_transform(&applicants(), None).unwrap();
    assert_eq!(x.column(0), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(ct.final_features(), &["SK_ID"]);
}

// ---------------------------------------------------------------------------
// Final features
// ---------------------------------------------------------------------------

#[test]
fn final_features_match_output_width() {
    let mut ct = NamedColumnTransformer::new(credit_steps(), credit_features(), true);
    let x = ct.fit_transform(&applicants(), Some(&TARGET)).unwrap();
    assert_eq!(
        ct.final_features(),
        &[
            "AMT_INCOME_TOTAL",
            "CODE_GENDER_F",
            "CODE_GENDER_M",
            "OCCUPATION_TYPE"
        ]
    );
    assert_eq!(x.shape(), (4, ct.final_features().len()));

    let again = ct.transform(&applicants()).unwrap();
    assert_eq!(again.ncols(), ct.final_features().len());
}

#[test]
fn get_all_column_names_matches_fitted_state() {
    let mut ct = NamedColumnTransformer::new(credit_steps(), credit_features(), true);
    ct.fit(&applicants(), Some(&TARGET)).unwrap();
    let names = NamedColumnTransformer::get_all_column_names(ct.steps()).unwrap();
    assert_eq!(names, ct.final_features());
}

#[test]
fn get_all_column_names_requires_fitted_encoders() {
    assert!(matches!(
        NamedColumnTransformer::get_all_column_names(&credit_steps()),
        Err(FeatureError::NotFitted(_))
    ));
}

#[test]
fn placeholder_substitution_uses_step_columns() {
    let names = substitute_all(
        &["x0_Young".to_string(), "x1_High".to_string()],
        &["age", "income"],
    );
    assert_eq!(names, vec!["age_Young", "income_High"]);
}

#[test]
fn placeholder_x1_does_not_match_inside_x10() {
    let columns: Vec<String> = (0..11).map(|i| format!("c{}", i)).collect();
    let names = substitute_all(&["x10_A".to_string(), "x1_B".to_string()], &columns);
    assert_eq!(names, vec!["c10_A", "c1_B"]);
}

#[test]
fn scaler_step_keeps_raw_column_name() {
    let steps = vec![TransformStep::new("num", StandardScaler::new(), &["salary"])];
    let table = Table::from_columns(vec![("salary", vec![1.0.into(), 3.0.into()])]).unwrap();
    let mut ct = NamedColumnTransformer::new(steps, FeatureSets::new(&["salary"], &[], &[]), true);
    ct.fit(&table, None).unwrap();
    assert_eq!(ct.final_features(), &["salary"]);
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

#[test]
fn transform_is_idempotent() {
    let mut ct = NamedColumnTransformer::new(credit_steps(), credit_features(), true);
    ct.fit(&applicants(), Some(&TARGET)).unwrap();
    let names = ct.final_features().to_vec();

    let first = ct.transform(&applicants()).unwrap();
    let second = ct.transform(&applicants()).unwrap();
    assert_eq!(first, second);
    assert_eq!(ct.final_features(), names.as_slice());
}

#[test]
fn hard_mode_reports_missing_columns() {
    let steps = vec![TransformStep::new("raw", Transformer::Passthrough, &["a"])];
    let mut ct = NamedColumnTransformer::new(steps, FeatureSets::new(&["a", "b"], &[], &[]), true);
    let only_a = Table::from_columns(vec![("a", vec![1.0.into()])]).unwrap();
    match ct.fit(&only_a, None) {
        Err(FeatureError::MissingColumns { missing }) => assert_eq!(missing, vec!["b"]),
        other => panic!("expected missing column error, got {:?}", other),
    }
    assert!(!ct.is_fitted());
}

#[test]
fn hard_mode_ignores_extra_columns_at_transform() {
    let mut ct = NamedColumnTransformer::new(credit_steps(), credit_features(), true);
    ct.fit(&applicants().without("SK_ID"), Some(&TARGET)).unwrap();
    let x = ct.transform(&applicants()).unwrap();
    assert_eq!(x.ncols(), 4);
}

#[test]
fn transform_before_fit_is_rejected() {
    let ct = NamedColumnTransformer::new(credit_steps(), credit_features(), true);
    assert!(matches!(
        ct.transform(&applicants()),
        Err(FeatureError::NotFitted(_))
    ));
}

#[test]
fn fit_transform_equals_fit_then_transform() {
    let mut a = NamedColumnTransformer::new(credit_steps(), credit_features(), true);
    let mut b = a.clone();
    let x_a = a.fit_transform(&applicants(), Some(&TARGET)).unwrap();
    b.fit(&applicants(), Some(&TARGET)).unwrap();
    let x_b = b.transform(&applicants()).unwrap();
    assert_eq!(x_a, x_b);
    assert_eq!(a.final_features(), b.final_features());
}

#[test]
fn fitted_transformer_survives_json() {
    let mut ct = NamedColumnTransformer::new(credit_steps(), credit_features(), true);
    ct.fit(&applicants(), Some(&TARGET)).unwrap();
    let json = serde_json::to_string(&ct).unwrap();
    let back: NamedColumnTransformer = serde_json::from_str(&json).unwrap();
    assert_eq!(
        back.transform(&applicants()).unwrap(),
        ct.transform(&applicants()).unwrap()
    );
}
