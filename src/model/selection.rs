use super::result::{JobLog, Tier};

impl JobLog {
    /// Flips the open/closed state of the node with `id`.
    ///
    /// Runs are searched first, then suites, then steps. Opening a node closes every
    /// other node of the same tier anywhere in the log; the other tiers are untouched.
    /// Returns the tier that was hit, or `None` when no node has that id.
    pub fn toggle(&mut self, id: u64) -> Option<Tier> {
        let tier = self.locate(id)?;
        match tier {
            Tier::Run => {
                for run in self
                    .steps
                    .iter_mut()
                    .flat_map(|s| s.test_suites.iter_mut())
                    .flat_map(|s| s.test_runs.iter_mut())
                {
                    run.selected = run.id == id && !run.selected;
                }
            }
            Tier::Suite => {
                for suite in self.steps.iter_mut().flat_map(|s| s.test_suites.iter_mut()) {
                    suite.selected = suite.id == id && !suite.selected;
                }
            }
            Tier::Step => {
                for step in &mut self.steps {
                    step.selected = step.id == id && !step.selected;
                }
            }
        }
        tracing::debug!(id, ?tier, "toggled");
        Some(tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::result::{Step, TestRun, TestSuite};
    use pretty_assertions::assert_eq;

    // step 1 { suite 2 { 3, 4 } }, step 5 { suite 6 { 7, 8 } }
    fn sample() -> JobLog {
        let mut steps = Vec::new();
        for base in [1, 5] {
            let mut step = Step::new(base, format!("step {base}"));
            step.test_suites.push(TestSuite {
                id: base + 1,
                title: format!("Suite: {base}"),
                test_count: 0,
                selected: false,
                test_runs: vec![TestRun::new(base + 2, ""), TestRun::new(base + 3, "T1")],
            });
            steps.push(step);
        }
        JobLog::new(steps)
    }

    fn selected(log: &JobLog) -> (Vec<u64>, Vec<u64>, Vec<u64>) {
        let steps = log.steps.iter().filter(|s| s.selected).map(|s| s.id).collect();
        let suites = log
            .steps
            .iter()
            .flat_map(|s| &s.test_suites)
            .filter(|s| s.selected)
            .map(|s| s.id)
            .collect();
        let runs = log
            .steps
            .iter()
            .flat_map(|s| &s.test_suites)
            .flat_map(|s| &s.test_runs)
            .filter(|r| r.selected)
            .map(|r| r.id)
            .collect();
        (steps, suites, runs)
    }

    #[test]
    fn toggle_step_opens_then_closes() {
        let mut log = sample();
        assert_eq!(log.toggle(1), Some(Tier::Step));
        assert_eq!(selected(&log), (vec![1], vec![], vec![]));
        assert_eq!(log.toggle(1), Some(Tier::Step));
        assert_eq!(selected(&log), (vec![], vec![], vec![]));
    }

    #[test]
    fn opening_another_step_closes_the_first() {
        let mut log = sample();
        log.toggle(1);
        log.toggle(5);
        assert_eq!(selected(&log), (vec![5], vec![], vec![]));
    }

    #[test]
    fn tiers_are_independent() {
        let mut log = sample();
        log.toggle(1);
        log.toggle(2);
        log.toggle(4);
        assert_eq!(selected(&log), (vec![1], vec![2], vec![4]));

        // a run in another step closes run 4 but leaves step and suite alone
        log.toggle(8);
        assert_eq!(selected(&log), (vec![1], vec![2], vec![8]));

        // a suite in another step closes suite 2 only
        log.toggle(6);
        assert_eq!(selected(&log), (vec![1], vec![6], vec![8]));
    }

    #[test]
    fn unknown_id_is_a_no_op() {
        let mut log = sample();
        log.toggle(2);
        let before = log.clone();
        assert_eq!(log.toggle(42), None);
        assert_eq!(log, before);
    }
}
