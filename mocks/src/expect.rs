//! Expectation machinery shared by the mocks in this crate.
//!
//! Each mocked operation owns an [`ExpectationSet`]: an ordered list of
//! configured expectations. An invocation walks the list, the first match
//! wins, and the configured reply is replayed. An invocation that matches
//! nothing is fatal, as is dropping a mock while an expectation has never
//! been matched.

use std::fmt;
use std::sync::Mutex;

/// Matches the arguments of a single invocation.
pub enum ArgMatcher<A> {
    /// Matches anything.
    Any,
    /// Matches arguments equal to the configured value.
    Eq(A),
    /// Matches arguments satisfying the predicate.
    Where(Box<dyn Fn(&A) -> bool + Send>),
}

/// Matcher for arguments equal to `value`.
pub fn eq<A>(value: A) -> ArgMatcher<A> {
    ArgMatcher::Eq(value)
}

/// Matcher accepting any arguments.
pub fn any<A>() -> ArgMatcher<A> {
    ArgMatcher::Any
}

/// Matcher for arguments satisfying `pred`.
pub fn satisfies<A>(pred: impl Fn(&A) -> bool + Send + 'static) -> ArgMatcher<A> {
    ArgMatcher::Where(Box::new(pred))
}

impl<A: PartialEq> ArgMatcher<A> {
    fn matches(&self, args: &A) -> bool {
        match self {
            ArgMatcher::Any => true,
            ArgMatcher::Eq(expected) => expected == args,
            ArgMatcher::Where(pred) => pred(args),
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for ArgMatcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgMatcher::Any => write!(f, "<any>"),
            ArgMatcher::Eq(expected) => write!(f, "{expected:?}"),
            ArgMatcher::Where(_) => write!(f, "<predicate>"),
        }
    }
}

/// How a matched expectation produces its reply.
enum Reply<A, R> {
    /// The same value, replayed on every match.
    Const(Box<dyn Fn() -> R + Send>),
    /// A single value, consumed by the first match.
    Once(Option<R>),
    /// Computed from the actual arguments.
    Computed(Box<dyn FnMut(&A) -> R + Send>),
}

/// One configured call expectation.
///
/// Created by test configuration, consumed by invocations, never
/// reconfigured afterward.
struct Expectation<A, R> {
    matcher: ArgMatcher<A>,
    reply: Option<Reply<A, R>>,
    side_effect: Option<Box<dyn FnMut(&A) + Send>>,
    /// How many invocations have matched so far.
    matched: u64,
    /// Exact number of matches required, when set via `times`.
    required: Option<u64>,
}

impl<A: fmt::Debug, R> Expectation<A, R> {
    fn is_met(&self) -> bool {
        match self.required {
            Some(n) => self.matched == n,
            None => self.matched > 0,
        }
    }

    fn describe(&self, operation: &str) -> String {
        let wanted = match self.required {
            Some(n) => format!("exactly {n} call(s)"),
            None => "at least one call".to_string(),
        };
        format!(
            "{operation}({:?}): expected {wanted}, matched {} time(s)",
            self.matcher, self.matched
        )
    }
}

/// Ordered registry of expectations for one mocked operation.
pub struct ExpectationSet<A, R> {
    operation: &'static str,
    expectations: Mutex<Vec<Expectation<A, R>>>,
}

impl<A, R> ExpectationSet<A, R>
where
    A: fmt::Debug + PartialEq + Send + 'static,
    R: Send + 'static,
{
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            expectations: Mutex::new(Vec::new()),
        }
    }

    /// Register a new expectation and return a builder for configuring it.
    pub fn expect(&self) -> CallBuilder<'_, A, R> {
        let mut expectations = self.expectations.lock().unwrap();
        expectations.push(Expectation {
            matcher: ArgMatcher::Any,
            reply: None,
            side_effect: None,
            matched: 0,
            required: None,
        });
        let index = expectations.len() - 1;
        drop(expectations);
        CallBuilder { set: self, index }
    }

    /// Replay the configured behavior for one invocation.
    ///
    /// # Panics
    ///
    /// When no expectation matches `args`, when the matched expectation has
    /// no reply configured, when a `return_once` reply is matched a second
    /// time, or when a `times(n)` bound is exceeded.
    pub fn call(&self, args: A) -> R {
        let operation = self.operation;
        let mut expectations = self.expectations.lock().unwrap();
        let Some(expectation) = expectations.iter_mut().find(|e| e.matcher.matches(&args))
        else {
            panic!("{operation}: unexpected call with arguments {args:?}");
        };

        expectation.matched += 1;
        if let Some(required) = expectation.required {
            if expectation.matched > required {
                panic!("{operation}: called more than the expected {required} time(s)");
            }
        }

        if let Some(effect) = expectation.side_effect.as_mut() {
            effect(&args);
        }

        match expectation.reply.as_mut() {
            None => {
                panic!("{operation}: no return value configured for call with arguments {args:?}")
            }
            Some(Reply::Const(produce)) => produce(),
            Some(Reply::Once(slot)) => slot
                .take()
                .unwrap_or_else(|| panic!("{operation}: return_once value already consumed")),
            Some(Reply::Computed(compute)) => compute(&args),
        }
    }

    /// Descriptions of expectations that have not been satisfied yet.
    pub fn unmet(&self) -> Vec<String> {
        self.expectations
            .lock()
            .unwrap()
            .iter()
            .filter(|e| !e.is_met())
            .map(|e| e.describe(self.operation))
            .collect()
    }
}

/// Fluent configuration handle for one registered expectation.
///
/// Returned by the mocks' `expect_*` methods; every setter mutates the
/// expectation in place and returns the builder for chaining.
pub struct CallBuilder<'a, A, R> {
    set: &'a ExpectationSet<A, R>,
    index: usize,
}

impl<A, R> CallBuilder<'_, A, R>
where
    A: fmt::Debug + PartialEq + Send + 'static,
    R: Send + 'static,
{
    fn update(&self, configure: impl FnOnce(&mut Expectation<A, R>)) {
        let mut expectations = self.set.expectations.lock().unwrap();
        configure(&mut expectations[self.index]);
    }

    /// Only match invocations whose arguments satisfy `matcher`.
    pub fn with(self, matcher: ArgMatcher<A>) -> Self {
        self.update(|e| e.matcher = matcher);
        self
    }

    /// Invoke `effect` with the actual arguments on every match, before the
    /// reply is produced.
    pub fn run(self, effect: impl FnMut(&A) + Send + 'static) -> Self {
        self.update(|e| e.side_effect = Some(Box::new(effect)));
        self
    }

    /// Reply with a clone of `value` on every match.
    pub fn return_const(self, value: R) -> Self
    where
        R: Clone,
    {
        self.update(|e| e.reply = Some(Reply::Const(Box::new(move || value.clone()))));
        self
    }

    /// Reply with `value` on the first match; a second match is fatal.
    ///
    /// For return types that are not `Clone`, such as channel receivers.
    pub fn return_once(self, value: R) -> Self {
        self.update(|e| e.reply = Some(Reply::Once(Some(value))));
        self
    }

    /// Compute the reply from the actual arguments on every match.
    pub fn returning(self, compute: impl FnMut(&A) -> R + Send + 'static) -> Self {
        self.update(|e| e.reply = Some(Reply::Computed(Box::new(compute))));
        self
    }

    /// Require exactly `n` matches instead of at least one.
    pub fn times(self, n: u64) -> Self {
        self.update(|e| e.required = Some(n));
        self
    }
}
