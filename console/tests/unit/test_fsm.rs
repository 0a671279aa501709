//! FSM unit tests

use devconsole::deploy::{DeploymentEvent, DeploymentFsm, DeploymentState};

#[test]
fn test_fsm_initial_state() {
    let fsm = DeploymentFsm::new();
    assert_eq!(fsm.state(), &DeploymentState::Pending);
    assert!(fsm.error().is_none());
    assert!(!fsm.state().accepts_progress());
}

#[test]
fn test_fsm_deploy_success_flow() {
    let mut fsm = DeploymentFsm::new();

    // Pending -> Deploying
    fsm.process(DeploymentEvent::Start).unwrap();
    assert_eq!(fsm.state(), &DeploymentState::Deploying);

    // Deploying -> Deployed
    fsm.process(DeploymentEvent::Succeeded).unwrap();
    assert_eq!(fsm.state(), &DeploymentState::Deployed);
    assert!(fsm.state().is_terminal());
}

#[test]
fn test_fsm_deploy_failure_flow() {
    let mut fsm = DeploymentFsm::new();

    fsm.process(DeploymentEvent::Start).unwrap();
    fsm.process(DeploymentEvent::Failed("test error".to_string()))
        .unwrap();

    assert_eq!(fsm.state(), &DeploymentState::Failed);
    assert_eq!(fsm.error(), Some("test error"));
}

#[test]
fn test_fsm_backend_finishes_before_acknowledging_cancel() {
    let mut fsm = DeploymentFsm::new();

    fsm.process(DeploymentEvent::Start).unwrap();
    fsm.process(DeploymentEvent::CancelRequested).unwrap();
    fsm.process(DeploymentEvent::Succeeded).unwrap();
    assert_eq!(fsm.state(), &DeploymentState::Deployed);
}

#[test]
fn test_fsm_backend_acknowledges_cancel_unprompted() {
    let mut fsm = DeploymentFsm::new();

    fsm.process(DeploymentEvent::Start).unwrap();
    fsm.process(DeploymentEvent::Cancelled).unwrap();
    assert_eq!(fsm.state(), &DeploymentState::Cancelled);
}

#[test]
fn test_fsm_invalid_transition() {
    let mut fsm = DeploymentFsm::new();

    // Cannot finish before starting
    assert!(fsm.process(DeploymentEvent::Succeeded).is_err());

    // Cannot request cancellation twice
    fsm.process(DeploymentEvent::Start).unwrap();
    fsm.process(DeploymentEvent::CancelRequested).unwrap();
    assert!(fsm.process(DeploymentEvent::CancelRequested).is_err());
}
