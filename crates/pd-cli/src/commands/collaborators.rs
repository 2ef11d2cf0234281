//! Collaborators backed by external programs.
//!
//! The narrator program gets the prompt on stdin and prints the speech. The
//! automation program gets the action (and, for typing, the click point) as
//! arguments and the lines to type on stdin. For `capture-position` it prints
//! the mouse position as `x y`. With no program configured, every call falls
//! back to manual handling.

use std::io::ErrorKind;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use pd_season::ScreenPoint;
use pd_season::collab::{
    Automation, AutomationAction, AutomationRequest, CollaboratorError, NarrativeRequest, Narrator,
};

/// Runs `program` with `args`, feeding `input` on stdin. Returns stdout.
async fn run_program(program: &str, args: &[String], input: String) -> Result<String, CollaboratorError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| CollaboratorError::Unavailable(format!("{program}: {e}")))?;

    // Feed stdin while stdout drains, so a chatty child cannot fill its pipe
    // and stall. Dropping the handle closes the child's stdin.
    let stdin = child.stdin.take();
    let feed = async move {
        match stdin {
            Some(mut stdin) => stdin.write_all(input.as_bytes()).await,
            None => Ok(()),
        }
    };
    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    let output = output.map_err(|e| CollaboratorError::Failed(e.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CollaboratorError::Failed(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    // A child may exit without reading all of its input.
    if let Err(e) = fed {
        if e.kind() != ErrorKind::BrokenPipe {
            return Err(CollaboratorError::Failed(e.to_string()));
        }
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `x y` or `x,y` as printed by the automation program.
fn parse_point(text: &str) -> Option<ScreenPoint> {
    let mut coords = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse::<i32>);
    let x = coords.next()?.ok()?;
    let y = coords.next()?.ok()?;
    if coords.next().is_some() {
        return None;
    }
    Some(ScreenPoint { x, y })
}

fn split_command(command: Option<String>) -> Option<(String, Vec<String>)> {
    let command = command?;
    let mut words = command.split_whitespace().map(String::from);
    let program = words.next()?;
    Some((program, words.collect()))
}

/// Narrator that shells out to a program.
pub struct ProgramNarrator {
    command: Option<(String, Vec<String>)>,
}

impl ProgramNarrator {
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: split_command(command),
        }
    }
}

impl Narrator for ProgramNarrator {
    async fn narrate(&self, request: &NarrativeRequest) -> Result<String, CollaboratorError> {
        let Some((program, args)) = &self.command else {
            return Err(CollaboratorError::Unavailable("no narrator configured".into()));
        };
        run_program(program, args, request.prompt()).await
    }
}

/// Room automation that shells out to a program.
pub struct ProgramAutomation {
    command: Option<(String, Vec<String>)>,
}

impl ProgramAutomation {
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: split_command(command),
        }
    }
}

impl ProgramAutomation {
    /// Run the program for `action` with extra arguments and stdin.
    async fn run(
        &self,
        action: AutomationAction,
        extra: &[String],
        input: String,
    ) -> Result<String, CollaboratorError> {
        let Some((program, base_args)) = &self.command else {
            return Err(CollaboratorError::Unavailable("no automation configured".into()));
        };
        let mut args = base_args.clone();
        args.extend(["--action".to_string(), action.as_str().to_string()]);
        args.extend_from_slice(extra);
        run_program(program, &args, input).await
    }
}

impl Automation for ProgramAutomation {
    async fn perform(&self, request: &AutomationRequest) -> Result<(), CollaboratorError> {
        let point = [
            "--x".to_string(),
            request.point.x.to_string(),
            "--y".to_string(),
            request.point.y.to_string(),
        ];
        self.run(request.action, &point, request.manual_text()).await?;
        Ok(())
    }

    async fn toggle_mute(&self) -> Result<(), CollaboratorError> {
        self.run(AutomationAction::ToggleMute, &[], String::new()).await?;
        Ok(())
    }

    async fn capture_point(&self) -> Result<ScreenPoint, CollaboratorError> {
        let out = self
            .run(AutomationAction::CapturePoint, &[], String::new())
            .await?;
        parse_point(&out).ok_or_else(|| {
            CollaboratorError::Failed(format!("unexpected position: {}", out.trim()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_printed_positions() {
        assert_eq!(parse_point("812 604\n"), Some(ScreenPoint { x: 812, y: 604 }));
        assert_eq!(parse_point("10,-3"), Some(ScreenPoint { x: 10, y: -3 }));
        assert_eq!(parse_point("10"), None);
        assert_eq!(parse_point("1 2 3"), None);
        assert_eq!(parse_point("error"), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn large_input_echoes_without_stalling() {
        let input = "voto\n".repeat(200_000);
        let run = run_program("cat", &[], input.clone());
        let out = tokio::time::timeout(std::time::Duration::from_secs(10), run)
            .await
            .expect("cat stalled")
            .unwrap();
        assert_eq!(out.len(), input.len());
    }

    #[tokio::test]
    async fn unconfigured_automation_is_unavailable() {
        let automation = ProgramAutomation::new(None);
        assert!(matches!(
            automation.toggle_mute().await,
            Err(CollaboratorError::Unavailable(_))
        ));
        assert!(automation.capture_point().await.is_err());
    }
}
