use super::*;

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("diagram-studio-cli-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[cfg(unix)]
fn fake_cli(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-mmdc");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn config_maps_theme_and_layout() {
    let mut theme = ThemeSettings::for_theme(Theme::Light);
    theme.rank_spacing = 80.0;
    let config = cli_config(&theme, 1234);
    assert_eq!(config["theme"], "default");
    assert_eq!(config["maxTextSize"], 1234);
    assert_eq!(config["flowchart"]["curve"], "basis");
    assert_eq!(config["flowchart"]["rankSpacing"], 80.0);
    assert_eq!(config["themeVariables"]["background"], "#ffffff");

    let dark = cli_config(&ThemeSettings::for_theme(Theme::Dark), 10);
    assert_eq!(dark["theme"], "dark");
}

#[tokio::test]
async fn missing_binary_fails_probe() {
    let renderer = CliRenderer::new("/nonexistent/mmdc-for-tests");
    let err = renderer.initialize(&RendererSettings::default()).await.unwrap_err();
    assert!(matches!(err, InitializationError::ProbeFailed(_)));
}

#[tokio::test]
async fn missing_binary_render_is_unavailable() {
    let renderer = CliRenderer::with_scratch_dir("/nonexistent/mmdc-for-tests", scratch_dir());
    let err = renderer
        .render("diagram-t-1", "graph TD\nA-->B", &ThemeSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RenderError::Unavailable(_)));
}

#[cfg(unix)]
#[tokio::test]
async fn successful_cli_run_returns_output_and_cleans_up() {
    let dir = scratch_dir();
    let program = fake_cli(
        &dir,
        r#"if [ "$1" = "--version" ]; then echo 11.4.0; exit 0; fi
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then out="$2"; fi
  shift
done
printf '<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>' > "$out""#,
    );
    let renderer = CliRenderer::with_scratch_dir(&program, &dir);
    renderer.initialize(&RendererSettings::default()).await.unwrap();

    let svg = renderer
        .render("diagram-t-2", "graph TD\nA-->B", &ThemeSettings::default())
        .await
        .unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(!dir.join("diagram-t-2.mmd").exists());
    assert!(!dir.join("diagram-t-2.svg").exists());
    assert!(!dir.join("diagram-t-2.config.json").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn cli_failure_surfaces_stderr_diagnostic() {
    let dir = scratch_dir();
    let program = fake_cli(&dir, "echo 'Parse error on line 2' >&2\nexit 1");
    let renderer = CliRenderer::with_scratch_dir(&program, &dir);

    let err = renderer
        .render("diagram-t-3", "graph TD\nA--", &ThemeSettings::default())
        .await
        .unwrap_err();
    assert_eq!(err.diagnostic(), "Parse error on line 2");
}

#[cfg(unix)]
#[tokio::test]
async fn silent_cli_failure_uses_fallback_diagnostic() {
    let dir = scratch_dir();
    let program = fake_cli(&dir, "exit 1");
    let renderer = CliRenderer::with_scratch_dir(&program, &dir);

    let err = renderer
        .render("diagram-t-4", "graph TD\nA--", &ThemeSettings::default())
        .await
        .unwrap_err();
    assert_eq!(err.diagnostic(), crate::render::FALLBACK_DIAGNOSTIC);
}
