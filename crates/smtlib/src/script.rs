use crate::command::Command;

/// An SMT-LIB script: a sequence of commands.
#[derive(Debug, Clone, Default)]
pub struct Script {
    commands: Vec<Command>,
}

impl Script {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn with_commands(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn push(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }

    pub fn extend(&mut self, cmds: impl IntoIterator<Item = Command>) {
        self.commands.extend(cmds);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Names introduced by declarations and definitions, in script order.
    pub fn declarations(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(Command::declared_name)
    }

    pub fn has_check_sat(&self) -> bool {
        self.commands.iter().any(|c| matches!(c, Command::CheckSat))
    }

    /// Append `(check-sat)` and `(get-model)` unless the script already
    /// requests them.
    pub fn ensure_check_sat_and_get_model(&mut self) {
        if !self.has_check_sat() {
            self.commands.push(Command::CheckSat);
        }
        if !self.commands.iter().any(|c| matches!(c, Command::GetModel)) {
            self.commands.push(Command::GetModel);
        }
    }
}

impl FromIterator<Command> for Script {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self::with_commands(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::Sort;
    use crate::term::Term;

    #[test]
    fn new_creates_empty_script() {
        let script = Script::new();
        assert!(script.is_empty());
        assert_eq!(script.len(), 0);
        assert!(script.commands().is_empty());
    }

    #[test]
    fn with_commands_creates_script() {
        let cmds = vec![
            Command::SetLogic("QF_LIA".to_string()),
            Command::DeclareConst("x".to_string(), Sort::Int),
            Command::CheckSat,
        ];
        let script = Script::with_commands(cmds);
        assert_eq!(script.len(), 3);
        assert!(!script.is_empty());
    }

    #[test]
    fn extend_after_push() {
        let mut script = Script::new();
        script.push(Command::SetLogic("QF_BV".to_string()));
        script.extend(vec![Command::CheckSat, Command::GetModel]);
        assert_eq!(script.len(), 3);
        assert!(matches!(&script.commands()[0], Command::SetLogic(_)));
        assert_eq!(script.commands()[1], Command::CheckSat);
        assert_eq!(script.commands()[2], Command::GetModel);
    }

    #[test]
    fn push_preserves_order() {
        let mut script = Script::new();
        script.push(Command::SetLogic("QF_LIA".to_string()));
        script.push(Command::DeclareConst("x".to_string(), Sort::Int));
        script.push(Command::Assert(Term::Gt(
            Box::new(Term::constant("x")),
            Box::new(Term::int(0)),
        )));
        script.push(Command::CheckSat);

        let cmds = script.commands();
        assert!(matches!(&cmds[0], Command::SetLogic(l) if l == "QF_LIA"));
        assert!(matches!(&cmds[1], Command::DeclareConst(n, Sort::Int) if n == "x"));
        assert!(matches!(&cmds[2], Command::Assert(_)));
        assert!(matches!(&cmds[3], Command::CheckSat));
    }

    #[test]
    fn declarations_lists_declared_names() {
        let script: Script = vec![
            Command::SetLogic("ALL".into()),
            Command::DeclareConst("x".into(), Sort::Int),
            Command::DeclareFun("f".into(), vec![Sort::Int], Sort::Bool),
            Command::DefineFun("y".into(), vec![], Sort::Int, Term::int(3)),
            Command::CheckSat,
        ]
        .into_iter()
        .collect();
        assert_eq!(script.declarations().collect::<Vec<_>>(), ["x", "f", "y"]);
    }

    #[test]
    fn ensure_check_sat_appends_once() {
        let mut script = Script::with_commands(vec![Command::DeclareConst(
            "x".into(),
            Sort::Bool,
        )]);
        assert!(!script.has_check_sat());
        script.ensure_check_sat_and_get_model();
        script.ensure_check_sat_and_get_model();
        assert_eq!(script.len(), 3);
        assert_eq!(script.commands()[1], Command::CheckSat);
        assert_eq!(script.commands()[2], Command::GetModel);
    }

    #[test]
    fn ensure_check_sat_keeps_existing_check() {
        let mut script = Script::with_commands(vec![Command::CheckSat]);
        script.ensure_check_sat_and_get_model();
        assert_eq!(script.commands(), &[Command::CheckSat, Command::GetModel]);
    }
}
