// Copyright 2026 the Facade Proxy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inspectable facade descriptions.
//!
//! The typed layer enforces composition at compile time. This module is its run-time mirror: a
//! [`FacadeBuilder`] accumulates conventions, skills, constraint levels and upward targets, and
//! [`FacadeBuilder::build`] checks the composition rules:
//!
//! - a later convention with the same dispatch identity replaces the earlier one;
//! - two signatures of one convention with the same receiver and arguments are ambiguous;
//! - a constraint level declared twice with different values conflicts, and so does a declared
//!   level weaker than the level of an included facade;
//! - destruction must be supported;
//! - every upward target must be a subset of the facade being built.
//!
//! Every typed facade describes itself through [`Facade::descriptor`](crate::Facade::descriptor).

use alloc::string::String;
use alloc::vec::Vec;
use core::any::type_name;
use core::fmt;

use hashbrown::{HashMap, HashSet};

use crate::constraint::ConstraintLevel;
use crate::convention::{Convention, Qualifier};

/// A skill a facade may support.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Skill {
    /// Views can be derived from owning proxies.
    AsView,
    /// The stored type is recorded in the table.
    Reflect,
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AsView => "as_view",
            Self::Reflect => "reflect",
        })
    }
}

/// A lifecycle operation governed by a constraint level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Copying the value.
    Copy,
    /// Moving the value to new storage.
    Relocation,
    /// Dropping the value.
    Destruction,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Copy => "copy",
            Self::Relocation => "relocation",
            Self::Destruction => "destruction",
        })
    }
}

/// One overload of a convention.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Receiver qualifier.
    pub qualifier: Qualifier,
    /// Argument tuple type name.
    pub args: &'static str,
    /// Output type name.
    pub output: &'static str,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({} self, {}) -> {}", self.qualifier, self.args, self.output)
    }
}

/// A convention and its overloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConventionSpec {
    dispatch: &'static str,
    tag: &'static str,
    signatures: Vec<Signature>,
}

impl ConventionSpec {
    /// A convention with no signatures yet.
    pub fn new(dispatch: &'static str, tag: &'static str) -> Self {
        Self {
            dispatch,
            tag,
            signatures: Vec::new(),
        }
    }

    /// The description of convention `C` with one signature per qualifier.
    pub fn of<C: Convention>(qualifiers: &[Qualifier]) -> Self {
        qualifiers.iter().fold(
            Self::new(type_name::<C>(), C::TAG),
            |spec, &qualifier| {
                spec.with_signature(Signature {
                    qualifier,
                    args: type_name::<C::Args>(),
                    output: type_name::<C::Output>(),
                })
            },
        )
    }

    /// Appends an overload.
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signatures.push(signature);
        self
    }

    /// Dispatch identity.
    pub fn dispatch(&self) -> &'static str {
        self.dispatch
    }

    /// Stable dispatch name.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Overloads in declaration order.
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    fn ambiguity(&self) -> Option<&Signature> {
        let mut seen = HashSet::with_capacity(self.signatures.len());
        self.signatures
            .iter()
            .find(|sig| !seen.insert((sig.qualifier, sig.args)))
    }
}

/// Why a facade is not a subset of another.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Mismatch {
    /// A convention is absent.
    #[error("convention `{0}` is missing")]
    Convention(&'static str),
    /// A convention is present without one of the overloads.
    #[error("convention `{dispatch}` lacks `{signature}`")]
    Signature {
        /// Dispatch identity.
        dispatch: &'static str,
        /// The missing overload.
        signature: Signature,
    },
    /// A skill is absent.
    #[error("skill `{0}` is missing")]
    Skill(Skill),
    /// A constraint level is stricter.
    #[error("{operation} requires {required}, only {available} is guaranteed")]
    Level {
        /// Operation.
        operation: Operation,
        /// Level required by the target.
        required: ConstraintLevel,
        /// Level guaranteed by the source.
        available: ConstraintLevel,
    },
}

/// Facade composition errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FacadeError {
    /// Two overloads of a convention have the same receiver and arguments.
    #[error("facade `{facade}`: convention `{dispatch}` declares `{signature}` more than once")]
    AmbiguousOverload {
        /// Facade name.
        facade: String,
        /// Dispatch identity.
        dispatch: &'static str,
        /// The duplicated overload.
        signature: Signature,
    },
    /// A constraint level was declared twice with different values.
    #[error("facade `{facade}`: {operation} declared both {first} and {second}")]
    ConflictingConstraint {
        /// Facade name.
        facade: String,
        /// Operation.
        operation: Operation,
        /// First declared level.
        first: ConstraintLevel,
        /// Conflicting level.
        second: ConstraintLevel,
    },
    /// A constraint level no handle can honor.
    #[error("facade `{facade}`: {operation} cannot be {level}")]
    UnsupportedConstraint {
        /// Facade name.
        facade: String,
        /// Operation.
        operation: Operation,
        /// Rejected level.
        level: ConstraintLevel,
    },
    /// An upward target is not a subset of the facade.
    #[error("facade `{facade}` cannot convert to `{target}`: {reason}")]
    IllegalUpwardConversion {
        /// Facade name.
        facade: String,
        /// Target facade name.
        target: String,
        /// First mismatch found.
        reason: Mismatch,
    },
}

/// A validated facade description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacadeDescriptor {
    name: String,
    conventions: Vec<ConventionSpec>,
    skills: Vec<Skill>,
    copy: ConstraintLevel,
    relocation: ConstraintLevel,
    destruction: ConstraintLevel,
    upward: Vec<FacadeDescriptor>,
}

impl FacadeDescriptor {
    /// Facade name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Conventions in declaration order.
    pub fn conventions(&self) -> &[ConventionSpec] {
        &self.conventions
    }

    /// The convention with the given dispatch identity.
    pub fn convention(&self, dispatch: &str) -> Option<&ConventionSpec> {
        self.conventions.iter().find(|c| c.dispatch == dispatch)
    }

    /// Whether `skill` is supported.
    pub fn supports(&self, skill: Skill) -> bool {
        self.skills.contains(&skill)
    }

    /// Copy level.
    pub fn copy(&self) -> ConstraintLevel {
        self.copy
    }

    /// Relocation level.
    pub fn relocation(&self) -> ConstraintLevel {
        self.relocation
    }

    /// Destruction level.
    pub fn destruction(&self) -> ConstraintLevel {
        self.destruction
    }

    /// Names of the facades this one converts to.
    pub fn upward_targets(&self) -> impl Iterator<Item = &str> + '_ {
        self.upward.iter().map(|target| target.name.as_str())
    }

    /// Whether `other` offers every convention, overload and skill of `self`, with constraint
    /// levels at least as strong.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.mismatch_against(other).is_none()
    }

    /// The first reason `self` is not a subset of `other`.
    pub fn mismatch_against(&self, other: &Self) -> Option<Mismatch> {
        let index: HashMap<&str, &ConventionSpec> = other
            .conventions
            .iter()
            .map(|c| (c.dispatch, c))
            .collect();
        for convention in &self.conventions {
            let Some(found) = index.get(convention.dispatch) else {
                return Some(Mismatch::Convention(convention.dispatch));
            };
            if let Some(signature) = convention
                .signatures
                .iter()
                .find(|sig| !found.signatures.contains(sig))
            {
                return Some(Mismatch::Signature {
                    dispatch: convention.dispatch,
                    signature: signature.clone(),
                });
            }
        }
        if let Some(&skill) = self.skills.iter().find(|s| !other.skills.contains(s)) {
            return Some(Mismatch::Skill(skill));
        }
        [
            (Operation::Copy, self.copy, other.copy),
            (Operation::Relocation, self.relocation, other.relocation),
            (Operation::Destruction, self.destruction, other.destruction),
        ]
        .into_iter()
        .find(|(_, required, available)| required > available)
        .map(|(operation, required, available)| Mismatch::Level {
            operation,
            required,
            available,
        })
    }
}

impl fmt::Display for FacadeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "facade {}", self.name)?;
        for convention in &self.conventions {
            for signature in &convention.signatures {
                writeln!(f, "  {} {signature}", convention.tag)?;
            }
        }
        for skill in &self.skills {
            writeln!(f, "  skill {skill}")?;
        }
        writeln!(
            f,
            "  copy {}, relocation {}, destruction {}",
            self.copy, self.relocation, self.destruction
        )?;
        for target in &self.upward {
            writeln!(f, "  upward {}", target.name)?;
        }
        Ok(())
    }
}

/// The declared and inherited level of one lifecycle operation.
#[derive(Copy, Clone, Debug, Default)]
struct Requirement {
    declared: Option<ConstraintLevel>,
    included: Option<ConstraintLevel>,
}

impl Requirement {
    fn resolve(self, default: ConstraintLevel) -> ConstraintLevel {
        self.declared
            .unwrap_or_else(|| self.included.map_or(default, |floor| floor.stricter(default)))
    }
}

/// Accumulates a facade description.
///
/// Methods take and return the builder by value. Errors found while accumulating are held and
/// reported by [`build`](Self::build).
#[derive(Clone, Debug)]
#[must_use]
pub struct FacadeBuilder {
    name: String,
    conventions: Vec<ConventionSpec>,
    index: HashMap<&'static str, usize>,
    skills: Vec<Skill>,
    copy: Requirement,
    relocation: Requirement,
    destruction: Requirement,
    upward: Vec<FacadeDescriptor>,
    error: Option<FacadeError>,
}

impl FacadeBuilder {
    /// An empty facade named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conventions: Vec::new(),
            index: HashMap::new(),
            skills: Vec::new(),
            copy: Requirement::default(),
            relocation: Requirement::default(),
            destruction: Requirement::default(),
            upward: Vec::new(),
            error: None,
        }
    }

    /// Adds a convention. A convention with the same dispatch identity is replaced.
    pub fn add_convention(mut self, spec: ConventionSpec) -> Self {
        match self.index.get(spec.dispatch) {
            Some(&at) => self.conventions[at] = spec,
            None => {
                self.index.insert(spec.dispatch, self.conventions.len());
                self.conventions.push(spec);
            }
        }
        self
    }

    /// Merges the conventions, skills, constraint levels and upward targets of `other`.
    ///
    /// `other`'s levels become a floor: declaring a weaker level, before or after, conflicts.
    /// With `allow_upward`, handles of the facade being built may convert to `other`.
    pub fn add_facade(self, other: &FacadeDescriptor, allow_upward: bool) -> Self {
        let mut this = other
            .conventions
            .iter()
            .cloned()
            .fold(self, Self::add_convention);
        this = other.skills.iter().fold(this, |b, &skill| b.support(skill));
        this = this
            .inherit(Operation::Copy, other.copy)
            .inherit(Operation::Relocation, other.relocation)
            .inherit(Operation::Destruction, other.destruction);
        for target in &other.upward {
            this = this.add_upward(target.clone());
        }
        if allow_upward {
            this = this.add_upward(other.clone());
        }
        this
    }

    fn add_upward(mut self, target: FacadeDescriptor) -> Self {
        if !self.upward.iter().any(|t| t.name == target.name) {
            self.upward.push(target);
        }
        self
    }

    /// Adds a skill.
    pub fn support(mut self, skill: Skill) -> Self {
        if !self.skills.contains(&skill) {
            self.skills.push(skill);
        }
        self
    }

    /// Declares the copy level.
    pub fn support_copy(self, level: ConstraintLevel) -> Self {
        self.declare(Operation::Copy, level)
    }

    /// Declares the relocation level.
    pub fn support_relocation(self, level: ConstraintLevel) -> Self {
        self.declare(Operation::Relocation, level)
    }

    /// Declares the destruction level.
    pub fn support_destruction(self, level: ConstraintLevel) -> Self {
        self.declare(Operation::Destruction, level)
    }

    fn requirement(&mut self, operation: Operation) -> &mut Requirement {
        match operation {
            Operation::Copy => &mut self.copy,
            Operation::Relocation => &mut self.relocation,
            Operation::Destruction => &mut self.destruction,
        }
    }

    fn declare(mut self, operation: Operation, level: ConstraintLevel) -> Self {
        let requirement = self.requirement(operation);
        let earlier = match *requirement {
            Requirement {
                declared: Some(first),
                ..
            } if first != level => Some(first),
            Requirement {
                included: Some(floor),
                ..
            } if !level.satisfies(floor) => Some(floor),
            _ => None,
        };
        if let Some(first) = earlier {
            return self.conflict(operation, first, level);
        }
        requirement.declared = Some(level);
        self
    }

    fn inherit(mut self, operation: Operation, level: ConstraintLevel) -> Self {
        let requirement = self.requirement(operation);
        requirement.included = Some(requirement.included.map_or(level, |l| l.stricter(level)));
        match requirement.declared {
            Some(first) if !first.satisfies(level) => self.conflict(operation, first, level),
            _ => self,
        }
    }

    fn conflict(
        self,
        operation: Operation,
        first: ConstraintLevel,
        second: ConstraintLevel,
    ) -> Self {
        let err = FacadeError::ConflictingConstraint {
            facade: self.name.clone(),
            operation,
            first,
            second,
        };
        self.poison(err)
    }

    /// Records an error to be reported by [`build`](Self::build). The first error wins.
    pub fn poison(mut self, err: FacadeError) -> Self {
        self.error.get_or_insert(err);
        self
    }

    /// Validates the composition.
    ///
    /// An undeclared level defaults to the stricter of the levels of included facades and the
    /// base default: [`ConstraintLevel::None`] for copy, [`ConstraintLevel::Nothrow`] for
    /// relocation and destruction.
    pub fn build(self) -> Result<FacadeDescriptor, FacadeError> {
        let name = self.name.clone();
        let result = self.validate();
        match &result {
            Ok(descriptor) => tracing::debug!(
                facade = %name,
                conventions = descriptor.conventions.len(),
                upward = descriptor.upward.len(),
                "facade described"
            ),
            Err(err) => tracing::warn!(facade = %name, error = %err, "facade rejected"),
        }
        result
    }

    fn validate(self) -> Result<FacadeDescriptor, FacadeError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let destruction = self.destruction.resolve(ConstraintLevel::Nothrow);
        if destruction == ConstraintLevel::None {
            return Err(FacadeError::UnsupportedConstraint {
                facade: self.name,
                operation: Operation::Destruction,
                level: destruction,
            });
        }
        for convention in &self.conventions {
            if let Some(signature) = convention.ambiguity() {
                return Err(FacadeError::AmbiguousOverload {
                    facade: self.name.clone(),
                    dispatch: convention.dispatch,
                    signature: signature.clone(),
                });
            }
        }
        let descriptor = FacadeDescriptor {
            name: self.name,
            conventions: self.conventions,
            skills: self.skills,
            copy: self.copy.resolve(ConstraintLevel::None),
            relocation: self.relocation.resolve(ConstraintLevel::Nothrow),
            destruction,
            upward: self.upward,
        };
        for target in &descriptor.upward {
            if let Some(reason) = target.mismatch_against(&descriptor) {
                return Err(FacadeError::IllegalUpwardConversion {
                    facade: descriptor.name.clone(),
                    target: target.name.clone(),
                    reason,
                });
            }
        }
        Ok(descriptor)
    }
}
