use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, PipeReader, PipeWriter};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use super::{PipelineRunner, ProcessError, StageOutcome};
use crate::config::ShellConfig;
use crate::core::parser::ParsedCommand;
use crate::highlight::SyntaxHighlighter;

const EXIT_FAILURE: i32 = 1;
const EXIT_NOT_EXECUTABLE: i32 = 126;
const EXIT_NOT_FOUND: i32 = 127;

/// Where one standard stream of a stage is bound.
#[derive(Debug)]
pub enum Endpoint {
    Inherit,
    File(PathBuf),
    PipeRead(PipeReader),
    PipeWrite(PipeWriter),
}

impl Endpoint {
    fn redirect(path: Option<&str>) -> Self {
        match path {
            Some(path) => Endpoint::File(PathBuf::from(path)),
            None => Endpoint::Inherit,
        }
    }
}

/// Descriptor remaps applied to a stage when it is spawned. Whatever the
/// stage does not take over is closed in the shell once the spawn returns.
#[derive(Debug)]
pub struct StageIo {
    pub stdin: Endpoint,
    pub stdout: Endpoint,
}

#[derive(Debug)]
pub enum Launch {
    Started(Child),
    /// The stage never ran; carries the exit status it is reported with.
    Failed(i32),
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Input,
    Output,
}

#[derive(Clone)]
pub struct PipelineExecutor {
    quiet_mode: bool,
    highlighter: SyntaxHighlighter,
}

impl PipelineExecutor {
    pub fn new(config: &ShellConfig) -> Self {
        PipelineExecutor {
            quiet_mode: config.quiet,
            highlighter: SyntaxHighlighter::new(),
        }
    }

    /// Launches `command` and, unless it is a background job, waits for
    /// every stage. Only failures to create processes or pipes are errors;
    /// a missing program or unusable redirection shows up as a
    /// [`StageOutcome::NotStarted`].
    pub fn execute(&self, command: &ParsedCommand) -> Result<Vec<StageOutcome>, ProcessError> {
        let launches = if command.has_pipe {
            self.launch_pipeline(command)?
        } else {
            let io = StageIo {
                stdin: Endpoint::redirect(command.infile.as_deref()),
                stdout: Endpoint::redirect(command.outfile.as_deref()),
            };
            vec![self.spawn_stage(&command.left_args, io)?]
        };

        if command.background {
            return Ok(launches.into_iter().map(detach).collect());
        }

        launches
            .into_iter()
            .map(|launch| self.wait(launch))
            .collect()
    }

    fn launch_pipeline(&self, command: &ParsedCommand) -> Result<Vec<Launch>, ProcessError> {
        let (reader, writer) = io::pipe().map_err(ProcessError::Pipe)?;

        let left = self.spawn_stage(
            &command.left_args,
            StageIo {
                stdin: Endpoint::redirect(command.infile.as_deref()),
                stdout: Endpoint::PipeWrite(writer),
            },
        )?;
        // The write end now lives only in the left child, so the right
        // stage sees end-of-file once it exits.
        let right = self.spawn_stage(
            &command.right_args,
            StageIo {
                stdin: Endpoint::PipeRead(reader),
                stdout: Endpoint::redirect(command.outfile.as_deref()),
            },
        )?;

        Ok(vec![left, right])
    }

    /// Spawns `args[0]` with `args` as its argument vector and the given
    /// stream bindings.
    pub fn spawn_stage(&self, args: &[String], io: StageIo) -> Result<Launch, ProcessError> {
        let Some((program, rest)) = args.split_first() else {
            return Ok(Launch::Failed(EXIT_FAILURE));
        };

        let Some(stdin) = self.bind(io.stdin, Direction::Input) else {
            return Ok(Launch::Failed(EXIT_FAILURE));
        };
        let Some(stdout) = self.bind(io.stdout, Direction::Output) else {
            return Ok(Launch::Failed(EXIT_FAILURE));
        };

        let mut command = Command::new(program);
        command
            .args(rest)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(Stdio::inherit());

        match command.spawn() {
            Ok(child) => {
                tracing::debug!(pid = child.id(), program = %program, "spawned stage");
                Ok(Launch::Started(child))
            }
            Err(e) if is_resource_exhaustion(&e) => Err(ProcessError::Spawn {
                command: program.clone(),
                source: e,
            }),
            Err(e) => Ok(Launch::Failed(self.report_launch_failure(program, &e))),
        }
    }

    fn bind(&self, endpoint: Endpoint, direction: Direction) -> Option<Stdio> {
        match endpoint {
            Endpoint::Inherit => Some(Stdio::inherit()),
            Endpoint::PipeRead(reader) => Some(reader.into()),
            Endpoint::PipeWrite(writer) => Some(writer.into()),
            Endpoint::File(path) => match open_redirect(&path, direction) {
                Ok(file) => Some(file.into()),
                Err(e) => {
                    self.report(&format!("osh: {}: {}", path.display(), describe(&e)));
                    None
                }
            },
        }
    }

    fn report_launch_failure(&self, program: &str, err: &io::Error) -> i32 {
        match err.kind() {
            ErrorKind::NotFound => {
                self.report(&format!("osh: command not found: {}", program));
                EXIT_NOT_FOUND
            }
            ErrorKind::PermissionDenied => {
                self.report(&format!("osh: permission denied: {}", program));
                EXIT_NOT_EXECUTABLE
            }
            _ => {
                self.report(&format!("osh: {}: {}", program, err));
                EXIT_FAILURE
            }
        }
    }

    fn report(&self, message: &str) {
        eprintln!("{}", self.highlighter.highlight_error(message));
    }

    fn wait(&self, launch: Launch) -> Result<StageOutcome, ProcessError> {
        let mut child = match launch {
            Launch::Started(child) => child,
            Launch::Failed(code) => return Ok(StageOutcome::NotStarted(code)),
        };

        let status = child.wait().map_err(ProcessError::Wait)?;
        tracing::debug!(pid = child.id(), %status, "stage finished");
        let outcome = StageOutcome::from(status);
        if let Some(message) = status_message(&outcome).filter(|_| !self.quiet_mode) {
            println!("{}", self.highlighter.highlight_warning(&message));
        }
        Ok(outcome)
    }
}

impl PipelineRunner for PipelineExecutor {
    fn execute(&self, command: &ParsedCommand) -> Result<Vec<StageOutcome>, ProcessError> {
        PipelineExecutor::execute(self, command)
    }
}

/// Status line for a finished foreground stage that failed.
fn status_message(outcome: &StageOutcome) -> Option<String> {
    if outcome.success() {
        return None;
    }
    outcome
        .code()
        .map(|code| format!("Process exited with status: {}", code))
}

fn open_redirect(path: &Path, direction: Direction) -> io::Result<File> {
    match direction {
        Direction::Input => File::open(path),
        Direction::Output => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(path),
    }
}

fn describe(err: &io::Error) -> String {
    match err.kind() {
        ErrorKind::NotFound => "No such file or directory".to_string(),
        ErrorKind::PermissionDenied => "Permission denied".to_string(),
        _ => err.to_string(),
    }
}

fn is_resource_exhaustion(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::EAGAIN | libc::ENOMEM | libc::EMFILE | libc::ENFILE)
    ) || err.kind() == ErrorKind::OutOfMemory
}

fn detach(launch: Launch) -> StageOutcome {
    match launch {
        Launch::Started(child) => {
            tracing::debug!(pid = child.id(), "left running in background");
            StageOutcome::Background(child.id())
        }
        Launch::Failed(code) => StageOutcome::NotStarted(code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::CommandParser;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::time::{Duration, Instant};

    fn executor() -> PipelineExecutor {
        PipelineExecutor::new(&ShellConfig {
            quiet: true,
            ..ShellConfig::default()
        })
    }

    fn run(line: &str) -> Vec<StageOutcome> {
        let command = CommandParser::default().parse(line).unwrap();
        executor().execute(&command).unwrap()
    }

    fn path_in(dir: &Path, name: &str) -> String {
        dir.join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn test_single_command_status() {
        assert_eq!(run("true"), vec![StageOutcome::Exited(0)]);
        assert_eq!(run("false"), vec![StageOutcome::Exited(1)]);
    }

    #[test]
    fn test_output_redirection_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = path_in(dir.path(), "out.txt");

        run(&format!("printf hello > {}", out));
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello");
        let mode = fs::metadata(&out).unwrap().permissions().mode();
        assert_eq!(mode & 0o133, 0, "mode {:o} is wider than rw-r--r--", mode);

        // Truncates on the next write.
        run(&format!("printf x > {}", out));
        assert_eq!(fs::read_to_string(&out).unwrap(), "x");
    }

    #[test]
    fn test_redirection_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = path_in(dir.path(), "source.bin");
        let out = path_in(dir.path(), "out.txt");
        let back = path_in(dir.path(), "back.txt");
        let bytes: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
        fs::write(&source, &bytes).unwrap();

        run(&format!("cat < {} > {}", source, out));
        run(&format!("cat < {} > {}", out, back));
        assert_eq!(fs::read(&back).unwrap(), bytes);
    }

    #[test]
    fn test_pipe_connects_stages() {
        let dir = tempfile::tempdir().unwrap();
        let out = path_in(dir.path(), "piped.txt");

        let outcomes = run(&format!("printf foo | cat > {}", out));
        assert_eq!(outcomes, vec![StageOutcome::Exited(0), StageOutcome::Exited(0)]);
        assert_eq!(fs::read_to_string(&out).unwrap(), "foo");
    }

    #[test]
    fn test_pipe_with_both_redirections() {
        let dir = tempfile::tempdir().unwrap();
        let input = path_in(dir.path(), "in.txt");
        let out = path_in(dir.path(), "sorted.txt");
        fs::write(&input, "b\na\nb\nc\na\n").unwrap();

        run(&format!("sort < {} | uniq > {}", input, out));
        assert_eq!(fs::read_to_string(&out).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn test_pipe_reader_sees_eof() {
        // wc only finishes once every write end of the pipe is closed.
        let dir = tempfile::tempdir().unwrap();
        let out = path_in(dir.path(), "count.txt");

        run(&format!("printf a\\nb\\n | wc -l > {}", out));
        assert_eq!(fs::read_to_string(&out).unwrap().trim(), "2");
    }

    #[test]
    fn test_command_not_found() {
        assert_eq!(
            run("definitely-not-a-command-osh"),
            vec![StageOutcome::NotStarted(127)]
        );
    }

    #[test]
    fn test_missing_left_stage_gives_reader_eof() {
        let dir = tempfile::tempdir().unwrap();
        let out = path_in(dir.path(), "empty.txt");

        let outcomes = run(&format!("definitely-not-a-command-osh | cat > {}", out));
        assert_eq!(outcomes[0], StageOutcome::NotStarted(127));
        assert_eq!(outcomes[1], StageOutcome::Exited(0));
        assert_eq!(fs::read_to_string(&out).unwrap(), "");
    }

    #[test]
    fn test_unreadable_input_file() {
        let outcomes = run("cat < /nonexistent/osh/input.txt");
        assert_eq!(outcomes, vec![StageOutcome::NotStarted(1)]);
    }

    #[test]
    fn test_unwritable_output_file() {
        let outcomes = run("printf x > /nonexistent/osh/out.txt");
        assert_eq!(outcomes, vec![StageOutcome::NotStarted(1)]);
    }

    #[test]
    fn test_background_does_not_wait() {
        let start = Instant::now();
        let outcomes = run("sleep 5 &");
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(matches!(outcomes[..], [StageOutcome::Background(_)]));
    }

    #[test]
    fn test_background_pipeline_does_not_wait() {
        let start = Instant::now();
        let outcomes = run("sleep 5 | sleep 5 &");
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| matches!(o, StageOutcome::Background(_))));
    }

    #[test]
    fn test_spawn_stage_directly() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("direct.txt");
        let io = StageIo {
            stdin: Endpoint::Inherit,
            stdout: Endpoint::File(out.clone()),
        };

        let args = vec!["echo".to_string(), "direct".to_string()];
        match executor().spawn_stage(&args, io).unwrap() {
            Launch::Started(mut child) => assert!(child.wait().unwrap().success()),
            Launch::Failed(code) => panic!("stage failed with {}", code),
        }
        assert_eq!(fs::read_to_string(out).unwrap(), "direct\n");
    }

    #[test]
    fn test_empty_stage() {
        let io = StageIo {
            stdin: Endpoint::Inherit,
            stdout: Endpoint::Inherit,
        };
        let launch = executor().spawn_stage(&[], io).unwrap();
        assert!(matches!(launch, Launch::Failed(1)));
    }

    #[test]
    fn test_status_message_uses_plain_code() {
        assert_eq!(
            status_message(&StageOutcome::Exited(1)).as_deref(),
            Some("Process exited with status: 1")
        );
        assert_eq!(
            status_message(&StageOutcome::Signaled(libc::SIGKILL)).as_deref(),
            Some("Process exited with status: 137")
        );
        assert_eq!(status_message(&StageOutcome::Exited(0)), None);
        assert_eq!(status_message(&StageOutcome::Background(7)), None);
    }

    #[test]
    fn test_resource_exhaustion_classification() {
        for errno in [libc::EAGAIN, libc::ENOMEM, libc::EMFILE, libc::ENFILE] {
            assert!(is_resource_exhaustion(&io::Error::from_raw_os_error(errno)));
        }
        assert!(is_resource_exhaustion(&io::Error::from(ErrorKind::OutOfMemory)));
        assert!(!is_resource_exhaustion(&io::Error::from_raw_os_error(libc::ENOENT)));
        assert!(!is_resource_exhaustion(&io::Error::from_raw_os_error(libc::EACCES)));
    }
}
