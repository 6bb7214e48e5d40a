//! Load coordination.
//!
//! [`LoadCoordinator`] owns the outstanding-load counter and the settling flag.
//! It performs no I/O: every mutation returns an outcome that tells the caller
//! whether a terminal event must be emitted. The flag is cleared by the same
//! call that reports [`EndOutcome::Settled`], [`FailOutcome::Failed`] or
//! [`ArmOutcome::SettledImmediately`], so at most one caller can ever be told
//! to emit for a given arming.

/// Outcome of [`LoadCoordinator::end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOutcome {
	/// The counter reached zero while settling. The caller must emit the
	/// completion event.
	Settled,
	/// Loads are still outstanding.
	Pending {
		/// Loads still in flight.
		outstanding: usize,
	},
	/// The counter reached zero but the navigation already settled.
	Late,
	/// There was nothing to end. The counter stayed at zero.
	Unbalanced,
}

/// Outcome of [`LoadCoordinator::fail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOutcome {
	/// The failure terminates the settling navigation. The caller must emit
	/// the failure event.
	Failed {
		/// Loads still in flight; their completions will be late.
		outstanding: usize,
	},
	/// The navigation already settled; the failure is only counted down.
	Late,
	/// There was no outstanding load to fail.
	Unbalanced,
}

/// Outcome of [`LoadCoordinator::arm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
	/// Nothing was loading. The caller must emit completion right away.
	SettledImmediately,
	/// Completion waits for the outstanding loads.
	Waiting {
		/// Loads in flight at arming time.
		outstanding: usize,
	},
}

/// Reference count of in-flight loads plus the settling flag.
#[derive(Debug, Clone, Default)]
pub struct LoadCoordinator {
	outstanding: usize,
	settling: bool,
	imbalance: usize,
}

impl LoadCoordinator {
	/// Creates an idle coordinator with nothing loading.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records the start of a load and returns the new count.
	pub fn begin(&mut self) -> usize {
		self.outstanding = self.outstanding.saturating_add(1);
		self.outstanding
	}

	/// Records the successful end of a load.
	pub fn end(&mut self) -> EndOutcome {
		if self.outstanding == 0 {
			self.imbalance += 1;
			return EndOutcome::Unbalanced;
		}

		self.outstanding -= 1;
		if self.outstanding > 0 {
			return EndOutcome::Pending {
				outstanding: self.outstanding,
			};
		}

		if self.settling {
			self.settling = false;
			EndOutcome::Settled
		} else {
			EndOutcome::Late
		}
	}

	/// Records a failed load.
	///
	/// A failure ends the settling navigation immediately, even with other
	/// loads still outstanding.
	pub fn fail(&mut self) -> FailOutcome {
		if self.outstanding == 0 {
			self.imbalance += 1;
			return FailOutcome::Unbalanced;
		}

		self.outstanding -= 1;
		if self.settling {
			self.settling = false;
			FailOutcome::Failed {
				outstanding: self.outstanding,
			}
		} else {
			FailOutcome::Late
		}
	}

	/// Arms the coordinator for a new navigation.
	///
	/// The counter is left untouched: loads started before the navigation keep
	/// counting towards its completion.
	pub fn arm(&mut self) -> ArmOutcome {
		if self.outstanding == 0 {
			self.settling = false;
			ArmOutcome::SettledImmediately
		} else {
			self.settling = true;
			ArmOutcome::Waiting {
				outstanding: self.outstanding,
			}
		}
	}

	/// Clears the settling flag without emitting, returning whether a
	/// navigation was still settling.
	pub fn supersede(&mut self) -> bool {
		std::mem::replace(&mut self.settling, false)
	}

	/// Loads currently in flight.
	pub fn outstanding(&self) -> usize {
		self.outstanding
	}

	/// Whether the current navigation is still waiting for its terminal event.
	pub fn is_settling(&self) -> bool {
		self.settling
	}

	/// How many unmatched `end`/`fail` calls have been absorbed.
	pub fn imbalance_count(&self) -> usize {
		self.imbalance
	}
}
