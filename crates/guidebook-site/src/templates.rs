//! Templates for the files the pipeline generates besides chapters.

use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;

/// Values available to the workflow template.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowContext {
    /// Branch that triggers a publish on push
    pub branch: String,
    /// Upstream repository merged in before each build
    pub upstream_url: String,
    /// Upstream branch
    pub upstream_branch: String,
    /// File the PDF is copied to
    pub pdf_output: String,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        // Markdown and YAML output, nothing to escape
        env.set_auto_escape_callback(|_| AutoEscape::None);

        env.add_template("NOTICE.md", NOTICE_TEMPLATE)
            .expect("Failed to add notice template");
        env.add_template("home.md", HOME_TEMPLATE)
            .expect("Failed to add home template");
        env.add_template("publish.yml", WORKFLOW_TEMPLATE)
            .expect("Failed to add workflow template");

        Self { env }
    }

    /// Render the NOTICE page.
    pub fn render_notice(&self) -> Result<String, minijinja::Error> {
        self.env.get_template("NOTICE.md")?.render(context! {})
    }

    /// Render the placeholder home page used when the split produced none.
    pub fn render_home(&self, heading: &str) -> Result<String, minijinja::Error> {
        self.env
            .get_template("home.md")?
            .render(context! { heading => heading })
    }

    /// Render the CI workflow that republishes the site.
    pub fn render_workflow(&self, ctx: &WorkflowContext) -> Result<String, minijinja::Error> {
        self.env.get_template("publish.yml")?.render(ctx)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const NOTICE_TEMPLATE: &str = r#"# NOTICE

WARNING: This documentation is known to have issues:

- **Cross-page anchors may fail:** Internal links (anchors) that reference headings across different pages might not work as expected. PDF generation may also be affected.

## Build Instructions

To build the documentation with MkDocs and generate a PDF, run the following command:

```bash
guidebook build
```

Please consult the repository issues or contact the maintainers for further assistance.
"#;

const HOME_TEMPLATE: &str = "# {{ heading }}\n\nWelcome to {{ heading }}!\n";

const WORKFLOW_TEMPLATE: &str = r#"name: Publish guidelines

on:
  push:
    branches: [{{ branch }}]
  schedule:
    - cron: "0 0 1 * *"
  workflow_dispatch:

permissions:
  contents: write
  pages: write
  id-token: write

concurrency:
  group: "pages"
  cancel-in-progress: false

jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - name: Checkout
        uses: actions/checkout@v4
        with:
          fetch-depth: 0

      - name: Set up Python
        uses: actions/setup-python@v5
        with:
          python-version: "3.x"

      - name: Install MkDocs
        run: pip install mkdocs mkdocs-material mkdocs-with-pdf mkdocs-open-in-new-tab

      - name: Install guidebook
        run: cargo install --path crates/guidebook

      - name: Merge upstream ({{ upstream_url }} {{ upstream_branch }})
        run: |
          git config user.name "github-actions[bot]"
          git config user.email "github-actions[bot]@users.noreply.github.com"
          guidebook sync

      - name: Build site and PDF
        run: guidebook build

      - name: Upload PDF
        uses: actions/upload-artifact@v4
        with:
          name: guidelines-pdf
          path: {{ pdf_output }}

      - name: Upload site
        uses: actions/upload-pages-artifact@v3
        with:
          path: ./site

  deploy:
    environment:
      name: github-pages
      url: {% raw %}${{ steps.deployment.outputs.page_url }}{% endraw %}
    runs-on: ubuntu-latest
    needs: build
    steps:
      - name: Deploy to GitHub Pages
        id: deployment
        uses: actions/deploy-pages@v4
"#;
