//! Dashboard surface: a static, externally hosted Power BI report embedded
//! read-only. No parameters, no interaction beyond passing the URL through.

pub const DASHBOARD_URL: &str = "https://app.powerbi.com/view?r=eyJrIjoiNjlhNmFjMGUtZGY2Zi00MDEyLWE4NDItODNkOTkzN2UwYTU4IiwidCI6ImRiNWRlZjZiLThmZDgtNGEzZS05MWRjLThkYjI1MDFhNjgyMiIsImMiOjEwfQ%3D%3D";

pub fn dashboard_iframe() -> String {
    format!(
        r#"<iframe title="Buffet Sale Performance Dashboard" width="100%" height="800" src="{}" frameborder="0" allowfullscreen="true"></iframe>"#,
        DASHBOARD_URL
    )
}
