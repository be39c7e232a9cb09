//! Method-style commands: a typed closure plus a parameter descriptor list.
//!
//! Each action gets a synthetic child processor whose state is a
//! [`Params`] array. Named parameters become options of that processor;
//! positional parameters are filled from bare tokens by its default
//! handler, in declaration order. Options may appear anywhere between the
//! positional tokens.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::binding::{Setter, SlotBinding, SlotKind};
use crate::config::DispatchConfig;
use crate::error::{ArgError, Result};
use crate::processor::{CommandHandler, CommandProcessor, DefaultHandler, Delegate};
use crate::queue::TokenQueue;
use crate::value::{ParamValue, Value, ValueType};

pub type ActionFn<S> = Box<dyn Fn(&mut S, &Params) -> anyhow::Result<()>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    Positional,
    Named { key: String, shortcut: Option<char> },
}

#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    pub name: String,
    pub kind: ParamKind,
    pub value_type: ValueType,
    pub default: Value,
}

/// Ordered parameter list of an action.
#[derive(Debug, Clone, Default)]
pub struct ParamList {
    descriptors: Vec<ParamDescriptor>,
}

impl ParamList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional<T: ParamValue>(self, name: &str) -> Self {
        self.push::<T>(name, ParamKind::Positional)
    }

    /// A parameter set through `--key`; its shortcut is the key's first letter.
    pub fn named<T: ParamValue>(self, name: &str, key: &str) -> Self {
        self.push::<T>(
            name,
            ParamKind::Named {
                key: key.to_string(),
                shortcut: None,
            },
        )
    }

    pub fn named_with_shortcut<T: ParamValue>(self, name: &str, key: &str, shortcut: char) -> Self {
        self.push::<T>(
            name,
            ParamKind::Named {
                key: key.to_string(),
                shortcut: Some(shortcut),
            },
        )
    }

    fn push<T: ParamValue>(mut self, name: &str, kind: ParamKind) -> Self {
        self.descriptors.push(ParamDescriptor {
            name: name.to_string(),
            kind,
            value_type: T::VALUE_TYPE,
            default: T::VALUE_TYPE.default_value(),
        });
        self
    }

    pub fn descriptors(&self) -> &[ParamDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Argument values handed to an action, addressed by parameter name.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    names: Rc<[String]>,
    values: Vec<Value>,
}

impl Params {
    fn defaults(list: &ParamList) -> Self {
        Self {
            names: list.descriptors.iter().map(|d| d.name.clone()).collect(),
            values: list.descriptors.iter().map(|d| d.default.clone()).collect(),
        }
    }

    pub fn get<T: ParamValue>(&self, name: &str) -> Result<T> {
        let value = self
            .value(name)
            .ok_or_else(|| ArgError::slot_access(name, "no such parameter"))?;
        T::from_value(value.clone()).ok_or_else(|| {
            ArgError::slot_access(
                name,
                format!("parameter holds {}, not {}", value.value_type(), T::VALUE_TYPE),
            )
        })
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|index| self.values.get(index))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn set(&mut self, index: usize, value: Value) -> Result<()> {
        let slot = self.values.get_mut(index).ok_or_else(|| {
            ArgError::slot_access(format!("#{}", index), "parameter index out of range")
        })?;
        if slot.value_type() != value.value_type() {
            return Err(ArgError::slot_access(
                self.names[index].as_str(),
                format!("expected {}, got {}", slot.value_type(), value.value_type()),
            ));
        }
        *slot = value;
        Ok(())
    }
}

struct ActionCommand<S> {
    key: String,
    processor: CommandProcessor<Params>,
    defaults: Params,
    action: ActionFn<S>,
}

impl<S> Delegate<S> for ActionCommand<S> {
    fn dispatch(&self, queue: &mut TokenQueue, state: &mut S) -> Result<()> {
        let mut params = self.defaults.clone();
        self.processor.process(queue, &mut params)?;
        debug!(command = %self.key, ?params, "invoking action");
        (self.action)(state, &params).map_err(ArgError::Action)
    }
}

fn param_binding(index: usize, key: String, value_type: ValueType) -> SlotBinding<Params> {
    let setter: Setter<Params> = Box::new(move |params, value| params.set(index, value));
    SlotBinding::new(key, value_type, setter)
}

/// Build the command handler for an action registered under `key`.
pub(crate) fn synthesize<S: 'static>(
    config: &DispatchConfig,
    key: &str,
    list: ParamList,
    action: ActionFn<S>,
) -> Result<CommandHandler<S>> {
    let mut processor = CommandProcessor::new(config.clone());
    let mut positional = Vec::new();

    for (index, param) in list.descriptors.iter().enumerate() {
        match &param.kind {
            ParamKind::Positional => {
                positional.push(
                    param_binding(index, param.name.clone(), param.value_type)
                        .with_kind(SlotKind::Positional)
                        .without_shortcut(),
                );
            }
            ParamKind::Named { key: option_key, .. } if option_key.is_empty() => {
                return Err(ArgError::configuration(format!(
                    "option parameter '{}' of command '{}' requires a key",
                    param.name, key
                )));
            }
            ParamKind::Named {
                key: option_key,
                shortcut,
            } => {
                let mut binding = param_binding(index, option_key.clone(), param.value_type);
                if let Some(shortcut) = shortcut {
                    binding = binding.with_shortcut(*shortcut);
                }
                processor.add_option(binding)?;
            }
        }
    }

    processor.set_default(DefaultHandler::custom(move |processor, queue, params| {
        fill_positionals(processor, queue, params, &positional)
    }));

    Ok(CommandHandler::Child(Box::new(ActionCommand {
        key: key.to_string(),
        processor,
        defaults: Params::defaults(&list),
        action,
    })))
}

/// One token per positional slot, still routing option tokens as they come.
fn fill_positionals(
    processor: &CommandProcessor<Params>,
    queue: &mut TokenQueue,
    params: &mut Params,
    slots: &[SlotBinding<Params>],
) -> Result<()> {
    let mut pending = slots.iter();
    while let Some(token) = queue.peek().map(str::to_owned) {
        if token.starts_with('-') {
            queue.remove();
            processor.apply_flag(&token, queue, params)?;
            continue;
        }
        let Some(slot) = pending.next() else {
            break;
        };
        queue.remove();
        slot.apply_token(&token, params)?;
    }

    if let Some(extra) = queue.peek() {
        warn!(argument = %extra, remaining = queue.len(), "ignoring surplus arguments");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Greeter {
        calls: Vec<(String, i32, bool)>,
    }

    fn greet() -> CommandHandler<Greeter> {
        let params = ParamList::new()
            .positional::<String>("name")
            .named::<i32>("count", "n")
            .named::<bool>("loud", "loud");
        synthesize(
            &DispatchConfig::default(),
            "greet",
            params,
            Box::new(|greeter: &mut Greeter, p: &Params| -> anyhow::Result<()> {
                greeter
                    .calls
                    .push((p.get("name")?, p.get("count")?, p.get("loud")?));
                Ok(())
            }),
        )
        .unwrap()
    }

    fn run(handler: &CommandHandler<Greeter>, tokens: &[&str]) -> Greeter {
        let mut greeter = Greeter::default();
        let mut queue: TokenQueue = tokens.iter().copied().collect();
        handler.invoke(&mut queue, &mut greeter).unwrap();
        greeter
    }

    #[test]
    fn test_named_before_positional() {
        let greeter = run(&greet(), &["--n", "3", "alice"]);
        assert_eq!(greeter.calls, vec![("alice".to_string(), 3, false)]);
    }

    #[test]
    fn test_named_after_positional() {
        let greeter = run(&greet(), &["alice", "--n", "3"]);
        assert_eq!(greeter.calls, vec![("alice".to_string(), 3, false)]);
    }

    #[test]
    fn test_shortcut_and_switch() {
        let greeter = run(&greet(), &["-n", "2", "bob", "-l"]);
        assert_eq!(greeter.calls, vec![("bob".to_string(), 2, true)]);
    }

    #[test]
    fn test_omitted_parameters_keep_defaults() {
        let greeter = run(&greet(), &[]);
        assert_eq!(greeter.calls, vec![(String::new(), 0, false)]);
    }

    #[test]
    fn test_surplus_tokens_are_left_alone() {
        let mut greeter = Greeter::default();
        let mut queue: TokenQueue = ["carol", "extra"].into_iter().collect();
        greet().invoke(&mut queue, &mut greeter).unwrap();
        assert_eq!(greeter.calls[0].0, "carol");
        assert_eq!(queue.peek(), Some("extra"));
    }

    #[test]
    fn test_bad_number_aborts_before_invocation() {
        let mut greeter = Greeter::default();
        let mut queue: TokenQueue = ["--n", "three", "dave"].into_iter().collect();
        let err = greet().invoke(&mut queue, &mut greeter).unwrap_err();
        assert!(matches!(err, ArgError::Parse { .. }));
        assert!(greeter.calls.is_empty());
    }

    #[test]
    fn test_empty_option_key_is_configuration_error() {
        let params = ParamList::new().named::<i32>("count", "");
        let result = synthesize(
            &DispatchConfig::default(),
            "broken",
            params,
            Box::new(|_: &mut Greeter, _: &Params| -> anyhow::Result<()> { Ok(()) }),
        );
        assert!(matches!(result, Err(ArgError::Configuration(_))));
    }

    #[test]
    fn test_defaults_for_every_kind() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let params = ParamList::new()
            .positional::<i32>("a")
            .positional::<i64>("b")
            .positional::<f64>("c")
            .positional::<f32>("d")
            .positional::<String>("e")
            .positional::<bool>("f")
            .positional::<Option<PathBuf>>("g");
        let handler = synthesize(
            &DispatchConfig::default(),
            "all",
            params,
            Box::new(move |_: &mut Greeter, p: &Params| -> anyhow::Result<()> {
                *sink.borrow_mut() = Some(p.values().to_vec());
                Ok(())
            }),
        )
        .unwrap();
        run(&handler, &[]);
        assert_eq!(
            seen.borrow().clone().unwrap(),
            vec![
                Value::Int(0),
                Value::Long(0),
                Value::Double(0.0),
                Value::Float(0.0),
                Value::Str(String::new()),
                Value::Bool(false),
                Value::File(None),
            ]
        );
    }

    #[test]
    fn test_positional_kinds_are_coerced() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let params = ParamList::new()
            .positional::<f64>("x")
            .positional::<bool>("flag")
            .positional::<Option<PathBuf>>("path");
        let handler = synthesize(
            &DispatchConfig::default(),
            "mix",
            params,
            Box::new(move |_: &mut Greeter, p: &Params| -> anyhow::Result<()> {
                let x: f64 = p.get("x")?;
                let flag: bool = p.get("flag")?;
                let path: Option<PathBuf> = p.get("path")?;
                *sink.borrow_mut() = Some((x, flag, path));
                Ok(())
            }),
        )
        .unwrap();
        run(&handler, &["2.5", "TRUE", "data.bin"]);
        assert_eq!(
            seen.borrow().clone(),
            Some((2.5, true, Some(PathBuf::from("data.bin"))))
        );
    }

    #[test]
    fn test_omitted_file_parameter_is_absent() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let params = ParamList::new().positional::<Option<PathBuf>>("path");
        let handler = synthesize(
            &DispatchConfig::default(),
            "open",
            params,
            Box::new(move |_: &mut Greeter, p: &Params| -> anyhow::Result<()> {
                *sink.borrow_mut() = Some(p.get::<Option<PathBuf>>("path")?);
                Ok(())
            }),
        )
        .unwrap();
        run(&handler, &[]);
        assert_eq!(seen.borrow().clone(), Some(None));
    }

    #[test]
    fn test_params_get_reports_wrong_type_and_name() {
        let list = ParamList::new().positional::<i32>("count");
        let params = Params::defaults(&list);
        assert_eq!(params.get::<i32>("count").unwrap(), 0);
        assert!(matches!(
            params.get::<String>("count"),
            Err(ArgError::SlotAccess { .. })
        ));
        assert!(matches!(
            params.get::<i32>("missing"),
            Err(ArgError::SlotAccess { .. })
        ));
    }
}
