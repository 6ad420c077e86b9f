//! Types for representing branches and branch outcomes.

/// A branch outcome.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    /// Returns 'true' if this outcome is taken.
    pub fn is_taken(self) -> bool {
        self == Self::T
    }

    /// Convert into a signed value: '+1' when taken, '-1' when not taken.
    pub fn sign(self) -> i32 {
        match self {
            Self::T => 1,
            Self::N => -1,
        }
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self {
        match x {
            true => Self::T,
            false => Self::N
        }
    }
}
impl From<Outcome> for bool {
    fn from(x: Outcome) -> Self {
        x.is_taken()
    }
}

/// Representing different kinds of branch/control-flow instructions.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BranchKind {
    /// A direct conditional branch instruction.
    DirectBranch = BranchFlags::BRN_FLAG,

    /// A direct unconditional jump instruction.
    DirectJump   = BranchFlags::JMP_FLAG,

    /// An indirect unconditional jump instruction.
    IndirectJump = BranchFlags::JMP_FLAG | BranchFlags::IND_FLAG,

    /// A direct procedure call instruction.
    DirectCall   = BranchFlags::CALL_FLAG,

    /// An indirect procedure call instruction.
    IndirectCall = BranchFlags::CALL_FLAG | BranchFlags::IND_FLAG,

    /// A return instruction.
    Return       = BranchFlags::RET_FLAG | BranchFlags::IND_FLAG,
}

/// A bitmask describing some branch instruction.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchFlags(pub u32);
impl BranchFlags {
    pub const BRN_FLAG: u32   = 1 << 0;
    pub const JMP_FLAG: u32   = 1 << 1;
    pub const CALL_FLAG: u32  = 1 << 2;
    pub const RET_FLAG: u32   = 1 << 3;
    pub const IND_FLAG: u32   = 1 << 4;

    pub fn is_brn(&self) -> bool { self.0 & Self::BRN_FLAG != 0 }
}
impl From<BranchKind> for BranchFlags {
    fn from(kind: BranchKind) -> Self {
        Self(kind as u32)
    }
}

/// A branch instance presented to a predictor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchInfo {
    /// The program counter value for this branch
    pub pc: usize,

    /// Flags describing the branch
    pub flags: BranchFlags,
}
impl BranchInfo {
    pub fn new(pc: usize, flags: impl Into<BranchFlags>) -> Self {
        Self { pc, flags: flags.into() }
    }

    /// Shorthand for a direct conditional branch at 'pc'.
    pub fn conditional(pc: usize) -> Self {
        Self::new(pc, BranchKind::DirectBranch)
    }

    /// Returns 'true' if this is a conditional instruction.
    pub fn is_conditional(&self) -> bool {
        self.flags.is_brn()
    }

    /// Returns 'true' if this is an unconditional instruction.
    pub fn is_unconditional(&self) -> bool {
        !self.flags.is_brn()
    }
}
