//! Terminal host around a `Calculator`
//!
//! Lines whose first token is a control command are handled here and
//! never reach the dispatcher. Everything else is evaluated against the
//! session stack.
//!
//! The host also owns the function editing buffer: `new-func` opens it,
//! `set-func` and `edit-func` change it, `save-func` compiles and
//! persists it, `revert-func` throws the changes away.

use progcalc_runtime::{
    Calculator, DefinitionStore, Outcome, Stack, is_control_word, strip_comments,
    validate_name,
};

/// Body given to a freshly created function
pub const FUNCTION_TEMPLATE: &str = "// Write your command body here";

const HELP: &str = r#"Type numbers and words separated by spaces, e.g. `1 2 3 collect 2 *`.

Functions:
  new-func NAME     Start a new function
  set-func BODY     Replace the body being edited
  edit-func         Edit the body in $EDITOR
  show-func [NAME]  Show a function's source, or the body being edited
  save-func         Compile the body and add it to your registry
  revert-func       Discard changes (also cancels a new function)
  reset-funcs       Remove your functions, leaving only the built-ins
  list-funcs        List every known word

  execute           Run the body being edited
  load              Reload your saved functions
  help              Show this help
  quit, exit        Leave"#;

/// What the host wants printed after a line
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The line went through the dispatcher
    Evaluated(Outcome),
    Message(String),
    Error(String),
    /// The buffer should be opened in an external editor
    Edit(String),
    Quit,
}

/// Function currently being edited
#[derive(Debug, Clone, PartialEq)]
struct Editing {
    name: String,
    buffer: String,
}

pub struct Host<S: DefinitionStore> {
    calc: Calculator,
    store: S,
    editing: Option<Editing>,
}

impl<S: DefinitionStore> Host<S> {
    pub fn new(calc: Calculator, store: S) -> Self {
        Host {
            calc,
            store,
            editing: None,
        }
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calc
    }

    pub fn stack(&self) -> &Stack {
        self.calc.stack()
    }

    /// Name of the function being edited, if any
    pub fn editing_name(&self) -> Option<&str> {
        self.editing.as_ref().map(|e| e.name.as_str())
    }

    pub fn buffer(&self) -> Option<&str> {
        self.editing.as_ref().map(|e| e.buffer.as_str())
    }

    /// Replace the editing buffer, e.g. with text from an external editor
    pub fn replace_buffer(&mut self, text: String) -> Reply {
        match self.editing.as_mut() {
            Some(editing) => {
                editing.buffer = text;
                Reply::Message(format!("Body of {} updated", editing.name))
            }
            None => Reply::Error("No function is being edited".to_string()),
        }
    }

    pub fn handle_line(&mut self, line: &str) -> Reply {
        let trimmed = line.trim();
        let (first, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest.trim()),
            None => (trimmed, ""),
        };

        if is_control_word(first) {
            self.control(&first.to_lowercase(), rest)
        } else {
            Reply::Evaluated(self.calc.execute(line))
        }
    }

    fn control(&mut self, command: &str, rest: &str) -> Reply {
        match command {
            "new-func" => self.new_func(rest),
            "set-func" => self.replace_buffer(rest.to_string()),
            "edit-func" => match self.buffer() {
                Some(buffer) => Reply::Edit(buffer.to_string()),
                None => Reply::Error("No function is being edited".to_string()),
            },
            "show-func" => self.show_func(rest),
            "save-func" | "save" => self.save_func(),
            "revert-func" => self.revert_func(),
            "reset-funcs" | "reset" => self.reset_funcs(),
            "list-funcs" => {
                let names: Vec<String> = self.calc.registry().list_names().into_iter().collect();
                Reply::Message(names.join(" "))
            }
            "load" => self.load(),
            "execute" => match self.buffer() {
                Some(buffer) => {
                    let program = strip_comments(buffer);
                    Reply::Evaluated(self.calc.execute(&program))
                }
                None => Reply::Error("Cannot execute when no function is being edited".to_string()),
            },
            "help" => Reply::Message(HELP.to_string()),
            "quit" | "exit" => Reply::Quit,
            other => Reply::Error(format!("Unknown control command {}", other)),
        }
    }

    fn new_func(&mut self, name: &str) -> Reply {
        if name.is_empty() {
            self.editing = None;
            return Reply::Message("New function cancelled".to_string());
        }

        match validate_name(name) {
            Ok(name) => {
                let message = format!("New function template added for {}", name);
                self.editing = Some(Editing {
                    name,
                    buffer: FUNCTION_TEMPLATE.to_string(),
                });
                Reply::Message(message)
            }
            Err(e) => Reply::Error(e.to_string()),
        }
    }

    fn show_func(&self, name: &str) -> Reply {
        if !name.is_empty() {
            return match self.calc.registry().resolve_source(name) {
                Some(source) => Reply::Message(source.to_string()),
                None => Reply::Error(format!("Command {} is not defined", name.to_lowercase())),
            };
        }

        match &self.editing {
            Some(editing) => Reply::Message(format!("{}:\n{}", editing.name, editing.buffer)),
            None => Reply::Error("No function is being edited".to_string()),
        }
    }

    fn save_func(&mut self) -> Reply {
        let Some(editing) = &self.editing else {
            return Reply::Error("Cannot save function when no function is being edited".to_string());
        };

        if let Err(e) = self
            .calc
            .registry_mut()
            .bind_user_definition(&editing.name, &editing.buffer)
        {
            return Reply::Error(e.to_string());
        }
        match self.persist() {
            Ok(()) => Reply::Message("Function saved and compiled".to_string()),
            Err(reply) => reply,
        }
    }

    fn revert_func(&mut self) -> Reply {
        let Some(editing) = self.editing.as_mut() else {
            return Reply::Error(
                "Cannot revert function when no function is being edited".to_string(),
            );
        };

        match self.calc.registry().resolve_source(&editing.name) {
            Some(source) => {
                editing.buffer = source.to_string();
                Reply::Message("Existing function code reset".to_string())
            }
            None => {
                self.editing = None;
                Reply::Message("New function cancelled".to_string())
            }
        }
    }

    fn reset_funcs(&mut self) -> Reply {
        self.calc.registry_mut().clear_user_definitions();
        match self.persist() {
            Ok(()) => Reply::Message("Default definitions restored and loaded".to_string()),
            Err(reply) => reply,
        }
    }

    fn load(&mut self) -> Reply {
        let saved = self.store.load();
        match self.calc.registry_mut().load_user_definitions(&saved) {
            Ok(()) => Reply::Message("Local definitions loaded and merged".to_string()),
            Err(e) => Reply::Error(e.to_string()),
        }
    }

    fn persist(&self) -> Result<(), Reply> {
        self.store
            .save(&self.calc.registry().user_definitions())
            .map_err(|e| Reply::Error(e.to_string()))
    }
}

/// Stack listing, top last, each entry labelled with its distance from the top
pub fn render_stack(stack: &Stack) -> String {
    if stack.is_empty() {
        return "(empty)".to_string();
    }

    let depth = stack.depth();
    stack
        .iter()
        .enumerate()
        .map(|(idx, value)| format!("{:>3}: {}", depth - idx, value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use progcalc_runtime::{MemoryStore, Value};

    fn host() -> Host<MemoryStore> {
        let calc = Calculator::with_base_library().unwrap();
        Host::new(calc, MemoryStore::new())
    }

    fn message(reply: Reply) -> String {
        match reply {
            Reply::Message(m) => m,
            other => panic!("expected a message, got {:?}", other),
        }
    }

    #[test]
    fn test_evaluates_plain_lines() {
        let mut host = host();
        assert_eq!(host.handle_line("1 2 +"), Reply::Evaluated(Outcome::Done));
        assert_eq!(host.stack().values(), &[Value::Scalar(3.0)]);
    }

    #[test]
    fn test_define_save_and_use() {
        let mut host = host();
        assert_eq!(
            message(host.handle_line("new-func Double")),
            "New function template added for double"
        );
        assert_eq!(host.buffer(), Some(FUNCTION_TEMPLATE));

        host.handle_line("set-func 2 *");
        assert_eq!(message(host.handle_line("save-func")), "Function saved and compiled");
        assert!(host.store.raw().unwrap().contains("\"double\""));

        host.handle_line("21 double");
        assert_eq!(host.stack().values(), &[Value::Scalar(42.0)]);
    }

    #[test]
    fn test_save_without_editing() {
        let mut host = host();
        assert_eq!(
            host.handle_line("save-func"),
            Reply::Error("Cannot save function when no function is being edited".to_string())
        );
        assert_eq!(
            host.handle_line("revert-func"),
            Reply::Error("Cannot revert function when no function is being edited".to_string())
        );
    }

    #[test]
    fn test_save_reports_compile_error() {
        let mut host = host();
        host.handle_line("new-func bad");
        host.handle_line("set-func native sqrt");
        match host.handle_line("save-func") {
            Reply::Error(e) => assert!(e.contains("Error compiling definition for bad")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(host.store.raw().is_none());
        assert!(!host.calculator().registry().is_user_defined("bad"));
    }

    #[test]
    fn test_new_func_rejects_reserved_and_numeric() {
        let mut host = host();
        assert!(matches!(host.handle_line("new-func save"), Reply::Error(_)));
        assert!(matches!(host.handle_line("new-func 12"), Reply::Error(_)));
        assert_eq!(host.editing_name(), None);
        assert_eq!(message(host.handle_line("new-func")), "New function cancelled");
    }

    #[test]
    fn test_revert_new_and_existing() {
        let mut host = host();
        host.handle_line("new-func fresh");
        assert_eq!(message(host.handle_line("revert-func")), "New function cancelled");
        assert_eq!(host.editing_name(), None);

        host.handle_line("new-func sum");
        host.handle_line("set-func 0");
        assert_eq!(message(host.handle_line("revert-func")), "Existing function code reset");
        assert!(host.buffer().unwrap().contains("native sum"));
    }

    #[test]
    fn test_reset_funcs_persists_empty() {
        let mut host = host();
        host.handle_line("new-func +");
        host.handle_line("set-func native subtract");
        host.handle_line("save-func");
        host.handle_line("5 3 +");
        assert_eq!(host.stack().values(), &[Value::Scalar(2.0)]);

        assert_eq!(
            message(host.handle_line("reset-funcs")),
            "Default definitions restored and loaded"
        );
        assert_eq!(host.store.load().len(), 0);
        host.handle_line("clear 5 3 +");
        assert_eq!(host.stack().values(), &[Value::Scalar(8.0)]);
    }

    #[test]
    fn test_show_func() {
        let mut host = host();
        assert!(message(host.handle_line("show-func SWAP")).contains("native swap"));
        assert!(matches!(host.handle_line("show-func nope"), Reply::Error(_)));

        host.handle_line("new-func sq");
        host.handle_line("set-func dup *");
        assert_eq!(message(host.handle_line("show-func")), "sq:\ndup *");
    }

    #[test]
    fn test_execute_runs_buffer() {
        let mut host = host();
        host.handle_line("new-func tmp");
        host.replace_buffer("// try it\n4 5 *".to_string());
        assert_eq!(host.handle_line("execute"), Reply::Evaluated(Outcome::Done));
        assert_eq!(host.stack().values(), &[Value::Scalar(20.0)]);
    }

    #[test]
    fn test_load_picks_up_store() {
        let mut host = host();
        let mut saved = std::collections::BTreeMap::new();
        saved.insert("triple".to_string(), "3 *".to_string());
        host.store.save(&saved).unwrap();

        assert_eq!(
            message(host.handle_line("load")),
            "Local definitions loaded and merged"
        );
        host.handle_line("2 triple");
        assert_eq!(host.stack().values(), &[Value::Scalar(6.0)]);
    }

    #[test]
    fn test_control_words_only_at_line_start() {
        let mut host = host();
        match host.handle_line("1 quit") {
            Reply::Evaluated(outcome) => {
                assert_eq!(outcome.message(), "Error in quit: Command quit is not defined")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(host.handle_line("  QUIT  "), Reply::Quit);
        assert!(matches!(host.handle_line("edit-func"), Reply::Error(_)));
    }

    #[test]
    fn test_list_funcs_includes_user_words() {
        let mut host = host();
        host.handle_line("new-func zz");
        host.handle_line("set-func 1");
        host.handle_line("save-func");
        let listing = message(host.handle_line("list-funcs"));
        assert!(listing.split(' ').any(|w| w == "average"));
        assert!(listing.ends_with("zz"));
    }

    #[test]
    fn test_render_stack() {
        let mut stack = Stack::new();
        assert_eq!(render_stack(&stack), "(empty)");
        stack.push(Value::Scalar(1.0));
        stack.push(Value::list([2.0, 3.0]));
        assert_eq!(render_stack(&stack), "  2: 1\n  1: [2 3]");
    }
}
