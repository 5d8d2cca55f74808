use crate::model::{UIStateData, UITransitionData, derive_view};
use crate::workflow::UIWorkflowData;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serializable snapshot of the derived view, for debugging and for
/// consumers that only need positions and identities.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDump {
    pub workflow_id: String,
    pub name: String,
    pub initial_state: Option<String>,
    pub layout_version: u64,
    pub states: Vec<UIStateData>,
    pub transitions: Vec<UITransitionData>,
    pub self_loops: Vec<String>,
}

impl ViewDump {
    pub fn from_workflow(workflow: &UIWorkflowData) -> Self {
        let view = derive_view(workflow);
        let self_loops = view
            .transitions
            .iter()
            .filter(|t| t.is_self_loop)
            .map(|t| t.id.clone())
            .collect();
        ViewDump {
            workflow_id: workflow.id.clone(),
            name: workflow.configuration.name.clone(),
            initial_state: workflow
                .configuration
                .effective_initial_state()
                .map(str::to_string),
            layout_version: workflow.layout.version,
            states: view.states,
            transitions: view.transitions,
            self_loops,
        }
    }
}

pub fn write_view_dump(path: Option<&Path>, workflow: &UIWorkflowData) -> anyhow::Result<()> {
    let dump = ViewDump::from_workflow(workflow);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, &dump)?;
            writeln!(handle)?;
        }
    }
    Ok(())
}
