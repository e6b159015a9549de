mod test_hang_up_during_negotiation;
