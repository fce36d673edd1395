mod basic_integration;
mod milestone_flow;
