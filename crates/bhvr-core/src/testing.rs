//! Test doubles for the collaborator seams
//!
//! Everything here is deterministic and in memory, so the assembler can be
//! driven end to end without a terminal, network or child processes.

use crate::fs::{MemoryFs, ProjectFs};
use crate::installers::Installer;
use crate::options::{OptionSet, PartialOptions};
use crate::prompt::{Choice, PromptError, Prompter};
use crate::runtime::{CommandError, CommandRunner};
use crate::templates::{FetchError, Slot, StoreError, TemplateFetcher, TemplateRef, TemplateSource, TemplateStore};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Repository used by fixtures
pub const FIXTURE_REPO: &str = "stevedylandev/bhvr";

/// Resolve `partial` with defaults against [`FIXTURE_REPO`]
pub fn options(partial: PartialOptions) -> Result<OptionSet, crate::options::ConfigError> {
    partial.resolve_defaults(FIXTURE_REPO)
}

/// One scripted reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    /// Index into the offered choices
    Select(usize),
    Multi(Vec<usize>),
    Confirm(bool),
    Cancel,
}

/// Replays answers in order and records every message it was asked.
///
/// Once the script runs out, each prompt takes its default.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: answers.into(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    fn next(&mut self, message: &str) -> Option<Answer> {
        self.asked.push(message.to_string());
        self.answers.pop_front()
    }
}

fn unexpected(message: &str, answer: &Answer) -> PromptError {
    PromptError::Io(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("scripted answer {:?} does not fit prompt '{}'", answer, message),
    ))
}

fn pick<T: Clone>(message: &str, choices: &[Choice<T>], index: usize) -> Result<T, PromptError> {
    choices.get(index).map(|c| c.value.clone()).ok_or_else(|| {
        PromptError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("choice {} out of range for '{}'", index, message),
        ))
    })
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, message: &str, default: &str) -> Result<String, PromptError> {
        match self.next(message) {
            None => Ok(default.to_string()),
            Some(Answer::Text(text)) => Ok(text),
            Some(Answer::Cancel) => Err(PromptError::Cancelled),
            Some(other) => Err(unexpected(message, &other)),
        }
    }

    fn select<T: Clone + Eq>(
        &mut self,
        message: &str,
        choices: &[Choice<T>],
        initial: &T,
    ) -> Result<T, PromptError> {
        match self.next(message) {
            None => Ok(initial.clone()),
            Some(Answer::Select(index)) => pick(message, choices, index),
            Some(Answer::Cancel) => Err(PromptError::Cancelled),
            Some(other) => Err(unexpected(message, &other)),
        }
    }

    fn multiselect<T: Clone + Eq>(
        &mut self,
        message: &str,
        choices: &[Choice<T>],
        initial: &[T],
    ) -> Result<Vec<T>, PromptError> {
        match self.next(message) {
            None => Ok(initial.to_vec()),
            Some(Answer::Multi(indices)) => indices
                .into_iter()
                .map(|i| pick(message, choices, i))
                .collect(),
            Some(Answer::Cancel) => Err(PromptError::Cancelled),
            Some(other) => Err(unexpected(message, &other)),
        }
    }

    fn confirm(&mut self, message: &str, initial: bool) -> Result<bool, PromptError> {
        match self.next(message) {
            None => Ok(initial),
            Some(Answer::Confirm(value)) => Ok(value),
            Some(Answer::Cancel) => Err(PromptError::Cancelled),
            Some(other) => Err(unexpected(message, &other)),
        }
    }
}

/// [`CommandRunner`] that records command lines instead of spawning them.
///
/// Every command succeeds unless its program was marked [`missing`] or the
/// exact command line was marked [`failing`].
///
/// [`missing`]: RecordingRunner::missing
/// [`failing`]: RecordingRunner::failing
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    missing: Vec<String>,
    failing: Vec<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `program` as not installed
    pub fn missing(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    /// Make `command_line` (e.g. `"bun install"`) exit non-zero
    pub fn failing(mut self, command_line: &str) -> Self {
        self.failing.push(command_line.to_string());
        self
    }

    /// Every command line run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        _cwd: &Path,
        _limit: Duration,
    ) -> Result<(), CommandError> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(line.clone());
        }

        if self.missing.iter().any(|m| m == program) {
            return Err(CommandError::Spawn {
                program: program.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "not installed"),
            });
        }
        if self.failing.contains(&line) {
            return Err(CommandError::Failed {
                program: program.to_string(),
                code: Some(1),
                stderr: format!("{} failed", line),
            });
        }
        Ok(())
    }
}

/// [`TemplateStore`] backed by a map
#[derive(Debug, Default)]
pub struct MemoryStore {
    variants: Mutex<BTreeMap<(Slot, String), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, slot: Slot, variant: &str, contents: impl AsRef<[u8]>) {
        if let Ok(mut variants) = self.variants.lock() {
            variants.insert((slot, variant.to_string()), contents.as_ref().to_vec());
        }
    }

    /// Store every variant `installer` reads for `options`, each holding its own name
    pub fn stock(&self, installer: &dyn Installer, options: &OptionSet) {
        for reference in installer.templates(options) {
            self.insert_ref(&reference);
        }
    }

    pub fn insert_ref(&self, reference: &TemplateRef) {
        self.insert(reference.slot, &reference.variant, reference.to_string());
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    fn variant_path(&self, slot: Slot, variant: &str) -> PathBuf {
        slot.under(Path::new("/extras")).join(variant)
    }

    fn contains(&self, slot: Slot, variant: &str) -> bool {
        self.variants
            .lock()
            .map(|v| v.contains_key(&(slot, variant.to_string())))
            .unwrap_or(false)
    }

    async fn read(&self, slot: Slot, variant: &str) -> Result<Vec<u8>, StoreError> {
        let found = self
            .variants
            .lock()
            .ok()
            .and_then(|v| v.get(&(slot, variant.to_string())).cloned());
        found.ok_or_else(|| StoreError::NotFound {
            path: self.variant_path(slot, variant),
        })
    }
}

/// [`TemplateFetcher`] that writes a fixed file set, or fails
#[derive(Debug, Default)]
pub struct StaticFetcher {
    files: Vec<(String, String)>,
    fail: bool,
    sources: Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// Fetches the bhvr base project from [`BASE_PROJECT`]
    pub fn base_project() -> Self {
        Self {
            files: BASE_PROJECT
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Sources requested so far
    pub fn sources(&self) -> Vec<String> {
        self.sources.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TemplateFetcher for StaticFetcher {
    async fn fetch(
        &self,
        source: &TemplateSource,
        dest: &Path,
        fs: &dyn ProjectFs,
    ) -> Result<usize, FetchError> {
        if let Ok(mut sources) = self.sources.lock() {
            sources.push(source.to_string());
        }
        if self.fail {
            return Err(FetchError::Empty(source.to_string()));
        }
        for (relative, contents) in &self.files {
            let path = relative
                .split('/')
                .fold(dest.to_path_buf(), |acc, part| acc.join(part));
            fs.write(&path, contents.as_bytes())
                .await
                .map_err(|source| FetchError::Write { path, source })?;
        }
        Ok(self.files.len())
    }
}

/// A trimmed copy of the bhvr `main` branch, as `(relative path, contents)`
pub const BASE_PROJECT: &[(&str, &str)] = &[
    (
        "package.json",
        r#"{
  "name": "bhvr",
  "version": "0.4.0",
  "workspaces": [
    "./server",
    "./client",
    "./shared"
  ],
  "scripts": {
    "dev": "concurrently \"bun run dev:shared\" \"bun run dev:server\" \"bun run dev:client\"",
    "build": "bun run build:shared && bun run build:server && bun run build:client",
    "postinstall": "bun run build:shared && bun run build:server"
  },
  "devDependencies": {
    "concurrently": "^9.1.2"
  }
}
"#,
    ),
    (".git/HEAD", "ref: refs/heads/main\n"),
    (
        "client/package.json",
        r#"{
  "name": "client",
  "private": true,
  "type": "module",
  "scripts": {
    "dev": "vite",
    "build": "tsc -b && vite build",
    "lint": "eslint .",
    "preview": "vite preview"
  },
  "dependencies": {
    "react": "^19.1.0",
    "react-dom": "^19.1.0",
    "server": "workspace:*",
    "shared": "workspace:*"
  },
  "devDependencies": {
    "@eslint/js": "^9.25.0",
    "@vitejs/plugin-react": "^4.4.1",
    "eslint": "^9.25.0",
    "eslint-plugin-react-hooks": "^5.2.0",
    "typescript": "~5.8.3",
    "typescript-eslint": "^8.30.1",
    "vite": "^6.3.5"
  }
}
"#,
    ),
    (
        "client/tsconfig.json",
        r#"{
  "files": [],
  "references": [
    { "path": "./tsconfig.app.json" },
    { "path": "./tsconfig.node.json" }
  ]
}
"#,
    ),
    (
        "client/vite.config.ts",
        r#"import { defineConfig } from "vite";
import react from "@vitejs/plugin-react";

export default defineConfig({
  plugins: [react()],
});
"#,
    ),
    ("client/eslint.config.js", "export default [];\n"),
    ("client/src/App.css", ".logo { height: 6em; }\n"),
    ("client/src/index.css", ":root { font-family: system-ui; }\n"),
    (
        "client/src/App.tsx",
        r#"import { useState } from "react";
import type { ApiResponse } from "shared/dist";

export default function App() {
  const [data, setData] = useState<ApiResponse | undefined>();
  return <pre>{JSON.stringify(data)}</pre>;
}
"#,
    ),
    (
        "client/src/main.tsx",
        r#"import { createRoot } from "react-dom/client";
import App from "./App.tsx";

createRoot(document.getElementById("root")!).render(<App />);
"#,
    ),
    (
        "server/package.json",
        r#"{
  "name": "server",
  "version": "0.0.1",
  "main": "dist/index.js",
  "types": "dist/index.d.ts",
  "scripts": {
    "build": "tsc",
    "dev": "bun --watch run src/index.ts && tsc --watch"
  },
  "exports": {
    ".": {
      "types": "./dist/index.d.ts",
      "default": "./dist/index.js"
    }
  },
  "dependencies": {
    "hono": "^4.7.11",
    "shared": "workspace:*"
  }
}
"#,
    ),
    (
        "server/src/index.ts",
        r#"import { Hono } from "hono";
import type { ApiResponse } from "shared/dist";

const app = new Hono();

app.get("/hello", (c) => c.json({ message: "Hello BHVR!", success: true } satisfies ApiResponse));

export default app;
"#,
    ),
    ("server/dist/index.js", "export default {};\n"),
    (
        "shared/package.json",
        r#"{
  "name": "shared",
  "version": "0.0.1",
  "main": "./dist/index.js",
  "types": "./dist/index.d.ts",
  "exports": {
    ".": {
      "types": "./dist/index.d.ts",
      "default": "./dist/index.js"
    }
  },
  "scripts": {
    "build": "tsc",
    "dev": "tsc --watch"
  }
}
"#,
    ),
    (
        "shared/src/index.ts",
        "export type ApiResponse = { message: string; success: true };\n",
    ),
    ("shared/dist/index.js", "export {};\n"),
];

/// Root that fixtures place the base project under
pub const PROJECT_ROOT: &str = "/work/my-bhvr-app";

/// A [`MemoryFs`] holding [`BASE_PROJECT`] under [`PROJECT_ROOT`]
pub fn base_project_fs() -> MemoryFs {
    let fs = MemoryFs::new();
    fs.insert_dir(PROJECT_ROOT);
    for (relative, contents) in BASE_PROJECT {
        let path = relative
            .split('/')
            .fold(PathBuf::from(PROJECT_ROOT), |acc, part| acc.join(part));
        fs.insert(path, contents);
    }
    fs
}

/// Contents of a `/`-separated path below [`PROJECT_ROOT`]
pub fn project_file(fs: &MemoryFs, relative: &str) -> Option<String> {
    fs.get(
        relative
            .split('/')
            .fold(PathBuf::from(PROJECT_ROOT), |acc, part| acc.join(part)),
    )
}
