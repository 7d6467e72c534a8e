use crate::class::{ClassTable, Method, MethodToken};
use crate::environment::Environment;
use crate::interpreter::Interpreter;
use std::fmt::{self, Display, Formatter};

pub struct ClassSummary<'a> {
    pub name: &'a str,
    pub base: Option<&'a str>,
    pub fields: &'a [String],
    pub methods: &'a [Method],
}

pub struct InstanceSummary<'a> {
    pub variable: &'a str,
    pub view: &'a str,
    pub runtime: &'a str,
    pub runtime_base: Option<&'a str>,
    pub fields: Vec<(&'a str, i64)>,
    pub methods: Vec<&'a str>,
}

/// End-of-run dump of the class structure followed by every variable.
pub struct Report<'a> {
    classes: Vec<ClassSummary<'a>>,
    instances: Vec<InstanceSummary<'a>>,
}

pub fn class_summaries(classes: &ClassTable) -> Vec<ClassSummary<'_>> {
    classes
        .iter()
        .map(|(id, class)| ClassSummary {
            name: &class.name,
            base: classes.base_name(id),
            fields: &class.fields,
            methods: &class.methods,
        })
        .collect()
}

pub fn instance_summaries<'a>(
    classes: &'a ClassTable,
    environment: &'a Environment,
) -> Vec<InstanceSummary<'a>> {
    environment
        .iter()
        .map(|(variable, binding)| {
            let runtime = binding.runtime_class();
            let instance = binding.instance();
            let fields = classes
                .all_fields(runtime)
                .into_iter()
                .filter_map(|field| instance.get(field).map(|value| (field, value)))
                .collect();
            InstanceSummary {
                variable,
                view: classes.name(binding.view()),
                runtime: classes.name(runtime),
                runtime_base: classes.base_name(runtime),
                fields,
                methods: classes.reachable_methods(binding.view()).into_iter().collect(),
            }
        })
        .collect()
}

impl<'a> Report<'a> {
    pub fn new(interpreter: &'a Interpreter) -> Self {
        Self {
            classes: class_summaries(interpreter.classes()),
            instances: instance_summaries(interpreter.classes(), interpreter.environment()),
        }
    }
}

fn or_none(items: Vec<String>) -> String {
    if items.is_empty() {
        String::from("(none)")
    } else {
        items.join(", ")
    }
}

impl Display for ClassSummary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Class {}:", self.name)?;
        writeln!(f, "  base   : {}", self.base.unwrap_or("None"))?;
        writeln!(f, "  fields : {}", or_none(self.fields.to_vec()))?;
        if self.methods.is_empty() {
            return writeln!(f, "  methods: (none)");
        }
        writeln!(f, "  methods:")?;
        for method in self.methods {
            let tokens: Vec<String> = method.body.iter().map(MethodToken::to_string).collect();
            writeln!(f, "    {} -> [{}]", method.name, tokens.join(", "))?;
        }
        Ok(())
    }
}

impl Display for InstanceSummary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let fields = self
            .fields
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        let methods = self.methods.iter().map(|name| name.to_string()).collect();
        writeln!(f, "Instance {}:", self.variable)?;
        writeln!(f, "  view type    : {}", self.view)?;
        writeln!(f, "  runtime type : {}", self.runtime)?;
        writeln!(f, "  runtime base : {}", self.runtime_base.unwrap_or("None"))?;
        writeln!(f, "  fields       : {}", or_none(fields))?;
        writeln!(f, "  methods (from view type): {}", or_none(methods))
    }
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "=== Class Structure ===")?;
        for class in &self.classes {
            writeln!(f, "{}", class)?;
        }
        writeln!(f, "=== Instances ===")?;
        if self.instances.is_empty() {
            return writeln!(f, "(no instances)");
        }
        for instance in &self.instances {
            writeln!(f, "{}", instance)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_program;
    use pretty_assertions::assert_eq;

    const PROGRAM: &str = "\
CLASS A
base = None
fields = [a]
methods = {
    show -> [a]
}

CLASS B
base = A
fields = [b]
methods = {
    show -> [b]
    extra -> [a, 1]
}

CLASS Bare

let y = new B(1, 2)
let x = cast<A> y
x.a = 4
";

    #[test]
    fn test_that_report_lists_classes_and_instances_by_name() {
        let interpreter = run_program(PROGRAM, |_| {}).unwrap();
        let expected = "
=== Class Structure ===
Class A:
  base   : None
  fields : a
  methods:
    show -> [a]

Class B:
  base   : A
  fields : b
  methods:
    show -> [b]
    extra -> [a, 1]

Class Bare:
  base   : None
  fields : (none)
  methods: (none)

=== Instances ===
Instance x:
  view type    : A
  runtime type : B
  runtime base : A
  fields       : a=4, b=2
  methods (from view type): show

Instance y:
  view type    : B
  runtime type : B
  runtime base : A
  fields       : a=4, b=2
  methods (from view type): extra, show

";
        assert_eq!(Report::new(&interpreter).to_string(), expected);
    }

    #[test]
    fn test_that_empty_environment_is_reported() {
        let interpreter = run_program("CLASS A\n", |_| {}).unwrap();
        let report = Report::new(&interpreter).to_string();
        assert!(report.ends_with("=== Instances ===\n(no instances)\n"));
    }

    #[test]
    fn test_that_summaries_expose_structured_views() {
        let interpreter = run_program(PROGRAM, |_| {}).unwrap();
        let classes = class_summaries(interpreter.classes());
        let names: Vec<&str> = classes.iter().map(|class| class.name).collect();
        assert_eq!(names, vec!["A", "B", "Bare"]);

        let instances = instance_summaries(interpreter.classes(), interpreter.environment());
        assert_eq!(instances[0].variable, "x");
        assert_eq!(instances[0].fields, vec![("a", 4), ("b", 2)]);
        assert_eq!(instances[0].methods, vec!["show"]);
        assert_eq!(instances[1].runtime_base, Some("A"));
    }
}
