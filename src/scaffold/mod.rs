//! Android project scaffolding.
//!
//! Templates are embedded into the binary using `include_str!` and rendered
//! by plain `{{name}}` substitution. The scaffolder runs once, from
//! `sdroid convert`; the sync loop never calls it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::convert::paths::{SOURCE_ROOT, package_dir};
use crate::error::Result;
use crate::sync::atomic_write;

/// UI toolkit of the generated project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UiToolkit {
    /// Jetpack Compose.
    #[default]
    Compose,
    /// Android views with XML layouts.
    Xml,
}

/// Dependency injection framework of the generated project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiFramework {
    #[default]
    Hilt,
    Koin,
    /// No framework; wire dependencies by hand.
    Manual,
}

/// Everything a scaffold needs to know about the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    pub package_name: String,
    pub app_name: String,
    pub min_sdk: u32,
    pub target_sdk: u32,
    pub ui: UiToolkit,
    pub di: DiFramework,
}

impl ProjectSettings {
    /// Settings with the app name derived from the package.
    #[must_use]
    pub fn new(package_name: &str, min_sdk: u32, target_sdk: u32, ui: UiToolkit, di: DiFramework) -> Self {
        Self {
            package_name: package_name.to_string(),
            app_name: app_name_for(package_name),
            min_sdk,
            target_sdk,
            ui,
            di,
        }
    }
}

/// App name for a package: last segment, title-cased, `_` and `-` removed.
///
/// `com.example.my_app` -> `MyApp`, `com.example.demo` -> `Demo`.
#[must_use]
pub fn app_name_for(package_name: &str) -> String {
    let last = package_name.rsplit('.').next().unwrap_or(package_name);
    let mut name = String::with_capacity(last.len());
    let mut word_start = true;
    for c in last.chars() {
        if c.is_alphabetic() {
            if word_start {
                name.extend(c.to_uppercase());
            } else {
                name.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            if c != '_' && c != '-' {
                name.push(c);
            }
            word_start = true;
        }
    }
    name
}

/// Produces the Android project skeleton.
pub trait Scaffolder {
    /// Create the project under `android_root`.
    ///
    /// Existing files are left alone unless `overwrite` is set. Returns the
    /// Android-relative paths of the files written.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or file cannot be created.
    fn scaffold(&self, android_root: &Path, settings: &ProjectSettings, overwrite: bool) -> Result<Vec<String>>;
}

/// One embedded template.
struct Template {
    name: &'static str,
    body: &'static str,
}

macro_rules! template {
    ($file:literal) => {
        Template {
            name: $file,
            body: include_str!(concat!("../../templates/", $file, ".tmpl")),
        }
    };
}

const PROJECT_GRADLE: Template = template!("build.gradle.kts");
const APP_GRADLE: Template = template!("app.build.gradle.kts");
const SETTINGS_GRADLE: Template = template!("settings.gradle.kts");
const GRADLE_PROPERTIES: Template = template!("gradle.properties");
const PROGUARD: Template = template!("proguard-rules.pro");
const GRADLE_WRAPPER: Template = template!("gradle-wrapper.properties");
const MANIFEST: Template = template!("AndroidManifest.xml");
const APPLICATION: Template = template!("Application.kt");
const ACTIVITY_COMPOSE: Template = template!("MainActivity.compose.kt");
const ACTIVITY_XML: Template = template!("MainActivity.xml.kt");
const MAIN_SCREEN: Template = template!("MainScreen.kt");
const ACTIVITY_LAYOUT: Template = template!("activity_main.xml");
const THEME_COLOR: Template = template!("Color.kt");
const THEME_TYPE: Template = template!("Type.kt");
const THEME: Template = template!("Theme.kt");
const STRINGS: Template = template!("strings.xml");
const THEMES: Template = template!("themes.xml");

const COMPOSE_CONFIG: &str = r#"buildFeatures { compose = true }
    composeOptions { kotlinCompilerExtensionVersion = "1.5.6" }"#;

const COMPOSE_DEPENDENCIES: &str = r#"implementation("androidx.activity:activity-compose:1.8.2")
    implementation(platform("androidx.compose:compose-bom:2024.01.00"))
    implementation("androidx.compose.ui:ui")
    implementation("androidx.compose.ui:ui-graphics")
    implementation("androidx.compose.ui:ui-tooling-preview")
    implementation("androidx.compose.material3:material3")
    implementation("androidx.lifecycle:lifecycle-viewmodel-compose:2.7.0")
    implementation("androidx.lifecycle:lifecycle-runtime-compose:2.7.0")
    implementation("androidx.navigation:navigation-compose:2.7.6")
    implementation("io.coil-kt:coil-compose:2.5.0")
    debugImplementation("androidx.compose.ui:ui-tooling")
    debugImplementation("androidx.compose.ui:ui-test-manifest")"#;

const COMPOSE_TEST_DEPENDENCIES: &str = r#"androidTestImplementation(platform("androidx.compose:compose-bom:2024.01.00"))
    androidTestImplementation("androidx.compose.ui:ui-test-junit4")"#;

const XML_CONFIG: &str = "buildFeatures { viewBinding = true }";

const XML_DEPENDENCIES: &str = r#"implementation("androidx.appcompat:appcompat:1.6.1")
    implementation("com.google.android.material:material:1.11.0")
    implementation("androidx.lifecycle:lifecycle-viewmodel-ktx:2.7.0")
    implementation("io.coil-kt:coil:2.5.0")"#;

const KSP_PLUGIN: &str = r#"id("com.google.devtools.ksp") version "1.9.21-1.0.15""#;

const HILT_PLUGIN_PROJECT: &str = r#"id("com.google.dagger.hilt.android") version "2.48.1" apply false"#;

const HILT_DEPENDENCIES: &str = r#"implementation("com.google.dagger:hilt-android:2.48.1")
    ksp("com.google.dagger:hilt-compiler:2.48.1")"#;

const HILT_COMPOSE_DEPENDENCIES: &str = r#"implementation("androidx.hilt:hilt-navigation-compose:1.1.0")"#;

const KOIN_DEPENDENCIES: &str = r#"implementation("io.insert-koin:koin-android:3.5.3")"#;

const KOIN_COMPOSE_DEPENDENCIES: &str = r#"implementation("io.insert-koin:koin-androidx-compose:3.5.3")"#;

/// Replace every `{{key}}` in `template`.
fn render(template: &str, vars: &[(&str, String)]) -> String {
    vars.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{{{key}}}}}"), value)
    })
}

/// Template-based Android scaffold (Gradle Kotlin DSL, single `app` module).
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateScaffolder;

impl TemplateScaffolder {
    fn directories(settings: &ProjectSettings) -> Vec<String> {
        let pkg = package_dir(&settings.package_name);
        let mut dirs: Vec<String> = [
            "model",
            "ui/theme",
            "ui/screens",
            "ui/components",
            "viewmodel",
            "data/repository",
            "data/remote",
            "data/local",
            "di",
            "util",
        ]
        .iter()
        .map(|sub| format!("{SOURCE_ROOT}/{pkg}/{sub}"))
        .collect();

        dirs.extend([
            "app/src/main/res/values".to_string(),
            "app/src/main/res/mipmap-hdpi".to_string(),
            format!("app/src/test/java/{pkg}"),
            format!("app/src/androidTest/java/{pkg}"),
            "gradle/wrapper".to_string(),
        ]);
        if settings.ui == UiToolkit::Xml {
            dirs.push("app/src/main/res/layout".to_string());
        }
        dirs
    }

    fn vars(settings: &ProjectSettings) -> Vec<(&'static str, String)> {
        let compose = settings.ui == UiToolkit::Compose;
        let app = &settings.app_name;

        let (hilt_plugin_project, app_plugins) = match settings.di {
            DiFramework::Hilt => (
                HILT_PLUGIN_PROJECT.to_string(),
                format!("id(\"com.google.dagger.hilt.android\")\n    {KSP_PLUGIN}"),
            ),
            DiFramework::Koin | DiFramework::Manual => (String::new(), KSP_PLUGIN.to_string()),
        };

        let di_dependencies = match (settings.di, compose) {
            (DiFramework::Hilt, true) => format!("{HILT_DEPENDENCIES}\n    {HILT_COMPOSE_DEPENDENCIES}"),
            (DiFramework::Hilt, false) => HILT_DEPENDENCIES.to_string(),
            (DiFramework::Koin, true) => format!("{KOIN_DEPENDENCIES}\n    {KOIN_COMPOSE_DEPENDENCIES}"),
            (DiFramework::Koin, false) => KOIN_DEPENDENCIES.to_string(),
            (DiFramework::Manual, _) => "// Manual dependency injection".to_string(),
        };

        let (app_imports, app_annotation, app_on_create) = match settings.di {
            DiFramework::Hilt => (
                "import dagger.hilt.android.HiltAndroidApp".to_string(),
                "@HiltAndroidApp".to_string(),
                String::new(),
            ),
            DiFramework::Koin => (
                "import org.koin.android.ext.koin.androidContext\nimport org.koin.core.context.startKoin"
                    .to_string(),
                String::new(),
                format!("\n        startKoin {{ androidContext(this@{app}Application) }}"),
            ),
            DiFramework::Manual => (String::new(), String::new(), String::new()),
        };

        let (activity_imports, activity_annotation) = match settings.di {
            DiFramework::Hilt => (
                "import dagger.hilt.android.AndroidEntryPoint".to_string(),
                "@AndroidEntryPoint".to_string(),
            ),
            DiFramework::Koin | DiFramework::Manual => (String::new(), String::new()),
        };

        vec![
            ("package_name", settings.package_name.clone()),
            ("app_name", app.clone()),
            ("min_sdk", settings.min_sdk.to_string()),
            ("target_sdk", settings.target_sdk.to_string()),
            ("hilt_plugin_project", hilt_plugin_project),
            ("app_plugins", app_plugins),
            ("ui_config", if compose { COMPOSE_CONFIG } else { XML_CONFIG }.to_string()),
            (
                "ui_dependencies",
                if compose { COMPOSE_DEPENDENCIES } else { XML_DEPENDENCIES }.to_string(),
            ),
            (
                "ui_test_dependencies",
                if compose { COMPOSE_TEST_DEPENDENCIES } else { "" }.to_string(),
            ),
            ("di_dependencies", di_dependencies),
            ("app_imports", app_imports),
            ("app_annotation", app_annotation),
            ("app_on_create", app_on_create),
            ("activity_imports", activity_imports),
            ("activity_annotation", activity_annotation),
            (
                "theme_parent",
                if compose {
                    "android:Theme.Material.Light.NoActionBar"
                } else {
                    "Theme.MaterialComponents.DayNight.NoActionBar"
                }
                .to_string(),
            ),
        ]
    }

    /// `(android-relative path, template)` for every generated file.
    fn files(settings: &ProjectSettings) -> Vec<(String, &'static Template)> {
        let src = format!("{SOURCE_ROOT}/{}", package_dir(&settings.package_name));
        let app = &settings.app_name;

        let mut files = vec![
            ("build.gradle.kts".to_string(), &PROJECT_GRADLE),
            ("app/build.gradle.kts".to_string(), &APP_GRADLE),
            ("settings.gradle.kts".to_string(), &SETTINGS_GRADLE),
            ("gradle.properties".to_string(), &GRADLE_PROPERTIES),
            ("app/proguard-rules.pro".to_string(), &PROGUARD),
            ("gradle/wrapper/gradle-wrapper.properties".to_string(), &GRADLE_WRAPPER),
            ("app/src/main/AndroidManifest.xml".to_string(), &MANIFEST),
            (format!("{src}/{app}Application.kt"), &APPLICATION),
            ("app/src/main/res/values/strings.xml".to_string(), &STRINGS),
            ("app/src/main/res/values/themes.xml".to_string(), &THEMES),
        ];

        match settings.ui {
            UiToolkit::Compose => files.extend([
                (format!("{src}/MainActivity.kt"), &ACTIVITY_COMPOSE),
                (format!("{src}/MainScreen.kt"), &MAIN_SCREEN),
                (format!("{src}/ui/theme/Color.kt"), &THEME_COLOR),
                (format!("{src}/ui/theme/Type.kt"), &THEME_TYPE),
                (format!("{src}/ui/theme/Theme.kt"), &THEME),
            ]),
            UiToolkit::Xml => files.extend([
                (format!("{src}/MainActivity.kt"), &ACTIVITY_XML),
                ("app/src/main/res/layout/activity_main.xml".to_string(), &ACTIVITY_LAYOUT),
            ]),
        }
        files
    }
}

impl Scaffolder for TemplateScaffolder {
    fn scaffold(&self, android_root: &Path, settings: &ProjectSettings, overwrite: bool) -> Result<Vec<String>> {
        for dir in Self::directories(settings) {
            fs::create_dir_all(android_root.join(dir))?;
        }

        let vars = Self::vars(settings);
        let mut written = Vec::new();
        for (rel, template) in Self::files(settings) {
            let path: PathBuf = android_root.join(&rel);
            if path.exists() && !overwrite {
                debug!(path = %rel, "Keeping existing file");
                continue;
            }
            debug!(path = %rel, template = template.name, "Rendering");
            atomic_write(&path, &render(template.body, &vars))?;
            written.push(rel);
        }

        info!(files = written.len(), app = %settings.app_name, "Scaffolded Android project");
        Ok(written)
    }
}
