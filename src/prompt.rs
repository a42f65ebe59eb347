// ABOUTME: Terminal prompts: rollback confirmation and interactive selection menus.
// ABOUTME: Confirmation is a trait so non-interactive runs and tests can answer it.

use crate::error::Result;
use crate::registry::TagRecord;
use crate::workload::ContainerInfo;
use async_trait::async_trait;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

/// Yes/no decision before a destructive step.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Approves everything; used with `--yes` and in non-interactive mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

#[async_trait]
impl Confirm for AutoApprove {
    async fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, "auto-approved");
        true
    }
}

/// Asks on the terminal. A failed prompt counts as "no".
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        dialoguer::Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(true)
            .interact()
            .unwrap_or(false)
    }
}

/// Outcome of the tag menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagChoice {
    Tag(String),
    /// The user wants to type the image instead.
    Manual,
}

const MANUAL_ENTRY: &str = "Enter image manually...";

/// Menu label for a tag.
pub fn tag_label(record: &TagRecord) -> String {
    match record.known_created_at() {
        Some(created) => format!("{} ({})", record.tag, created.format("%Y-%m-%d %H:%M:%S")),
        None => record.tag.clone(),
    }
}

pub fn select_deployment(names: &[String]) -> Result<usize> {
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select deployment")
        .items(names)
        .default(0)
        .interact()?;
    Ok(selection)
}

pub fn select_container(containers: &[ContainerInfo]) -> Result<usize> {
    let labels: Vec<String> = containers
        .iter()
        .map(|c| format!("{} ({})", c.name, c.image))
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select container")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(selection)
}

pub fn select_tag(image: &str, tags: &[TagRecord]) -> Result<TagChoice> {
    let mut labels: Vec<String> = tags.iter().map(tag_label).collect();
    labels.push(MANUAL_ENTRY.to_string());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Select tag for {image}"))
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(match tags.get(selection) {
        Some(record) => TagChoice::Tag(record.tag.clone()),
        None => TagChoice::Manual,
    })
}

/// Free-form image entry, pre-filled with `current`.
pub fn input_image(current: &str) -> Result<String> {
    let image: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Image")
        .with_initial_text(current)
        .interact_text()?;
    Ok(image.trim().to_string())
}
