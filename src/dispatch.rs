use log::info;

use crate::channel::Command;
use crate::session::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TestKind {
    Cataract,
    Glare,
    LowContrast,
}

/// Static presentation settings for one kind of acuity test
#[derive(Debug, PartialEq, Eq)]
pub struct TestConfig {
    pub kind: TestKind,
    pub command: &'static str,
    pub label: &'static str,
    pub optotype: Rgb,
    pub background: Rgb,
}

pub static TEST_CONFIGS: [TestConfig; 3] = [
    TestConfig {
        kind: TestKind::Cataract,
        command: "CMD:CATARACT",
        label: "CATARACT",
        optotype: Rgb::BLACK,
        background: Rgb::WHITE,
    },
    TestConfig {
        kind: TestKind::Glare,
        command: "CMD:GLARE",
        label: "GLARE",
        optotype: Rgb::BLACK,
        background: Rgb::GLARE,
    },
    TestConfig {
        kind: TestKind::LowContrast,
        command: "CMD:LOWCONTRAST",
        label: "LOW CONTRAST",
        optotype: Rgb::LOW_CONTRAST_GRAY,
        background: Rgb::WHITE,
    },
];

impl TestKind {
    pub const ALL: [TestKind; 3] = [TestKind::Cataract, TestKind::Glare, TestKind::LowContrast];

    pub fn config(self) -> &'static TestConfig {
        match self {
            TestKind::Cataract => &TEST_CONFIGS[0],
            TestKind::Glare => &TEST_CONFIGS[1],
            TestKind::LowContrast => &TEST_CONFIGS[2],
        }
    }
}

/// Housekeeping messages the kiosk firmware sends besides test triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemCommand {
    Menu,
    Restart,
    Shutdown,
}

impl SystemCommand {
    pub fn message(&self) -> &'static str {
        match self {
            SystemCommand::Menu => "Kiosk initialized, main menu displayed.",
            SystemCommand::Restart => "Kiosk restarted.",
            SystemCommand::Shutdown => "Kiosk shutting down. End communication.",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Action<'a> {
    RunTest(&'static TestConfig),
    System(SystemCommand),
    Info(&'a str),
    Ignore,
}

/// Exact, case-sensitive lookup of a command
pub fn dispatch(command: &Command) -> Action<'_> {
    let text = command.as_str();
    if text.is_empty() {
        return Action::Ignore;
    }

    if let Some(config) = TestKind::ALL
        .iter()
        .map(|kind| kind.config())
        .find(|c| c.command == text)
    {
        return Action::RunTest(config);
    }

    match text {
        "CMD:MENU" => Action::System(SystemCommand::Menu),
        "CMD:RESTART" => Action::System(SystemCommand::Restart),
        "CMD:SHUTDOWN" => Action::System(SystemCommand::Shutdown),
        other => Action::Info(other),
    }
}

/// Logs a command that does not launch a test. Emits exactly one line.
pub fn default_action(action: &Action<'_>) {
    match action {
        Action::System(cmd) => info!("SYSTEM: {}", cmd.message()),
        Action::Info(text) => info!("Menu/Debug command received: {}", text),
        Action::RunTest(_) | Action::Ignore => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn cmd(s: &str) -> Command {
        Command::from(s)
    }

    #[test]
    fn known_tests_map_to_their_config() {
        let c = cmd("CMD:CATARACT");
        assert_matches!(dispatch(&c), Action::RunTest(cfg) if cfg.kind == TestKind::Cataract);

        let c = cmd("CMD:GLARE");
        assert_matches!(dispatch(&c), Action::RunTest(cfg) => {
            assert_eq!(cfg.label, "GLARE");
            assert_eq!(cfg.optotype, Rgb::BLACK);
            assert_eq!(cfg.background, Rgb(255, 255, 250));
        });

        let c = cmd("CMD:LOWCONTRAST");
        assert_matches!(dispatch(&c), Action::RunTest(cfg) => {
            assert_eq!(cfg.label, "LOW CONTRAST");
            assert_eq!(cfg.optotype, Rgb(200, 200, 200));
            assert_eq!(cfg.background, Rgb::WHITE);
        });
    }

    #[test]
    fn matching_is_case_sensitive() {
        let c = cmd("cmd:cataract");
        assert_eq!(dispatch(&c), Action::Info("cmd:cataract"));
        let c = cmd("CMD:Glare");
        assert_eq!(dispatch(&c), Action::Info("CMD:Glare"));
    }

    #[test]
    fn unknown_command_is_informational() {
        let c = cmd("CMD:FOO");
        assert_eq!(dispatch(&c), Action::Info("CMD:FOO"));
        let c = cmd("DBG:5");
        assert_eq!(dispatch(&c), Action::Info("DBG:5"));
    }

    #[test]
    fn empty_command_is_ignored() {
        assert_eq!(dispatch(&cmd("")), Action::Ignore);
    }

    #[test]
    fn system_commands_are_recognized() {
        assert_eq!(
            dispatch(&cmd("CMD:MENU")),
            Action::System(SystemCommand::Menu)
        );
        assert_eq!(
            dispatch(&cmd("CMD:RESTART")),
            Action::System(SystemCommand::Restart)
        );
        assert_eq!(
            dispatch(&cmd("CMD:SHUTDOWN")),
            Action::System(SystemCommand::Shutdown)
        );
    }

    #[test]
    fn default_action_logs_once_per_command() {
        testing_logger::setup();
        default_action(&dispatch(&cmd("CMD:RESTART")));
        default_action(&dispatch(&cmd("")));
        default_action(&dispatch(&cmd("DBG:5")));
        testing_logger::validate(|logs| {
            let bodies: Vec<&str> = logs.iter().map(|l| l.body.as_str()).collect();
            assert_eq!(
                bodies,
                vec!["SYSTEM: Kiosk restarted.", "Menu/Debug command received: DBG:5"]
            );
        });
    }

    #[test]
    fn every_kind_has_exactly_one_config() {
        for kind in TestKind::ALL {
            let matching = TEST_CONFIGS.iter().filter(|c| c.kind == kind).count();
            assert_eq!(matching, 1);
            assert_eq!(kind.config().kind, kind);
        }
    }
}
